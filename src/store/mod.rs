pub mod json;

use std::collections::BTreeMap;

use crate::app::Result;
use crate::domain::Sitemap;

pub use json::JsonStore;

/// Shared folder id → timestamp of the last activity that was mirrored.
pub type ProcessedFolders = BTreeMap<String, String>;

pub trait SitemapStore {
    /// Sitemap of a host; empty when none was saved yet.
    fn load_sitemap(&self, host: &str) -> Result<Sitemap>;

    /// Persists `sitemap`, keeping previously saved entries whose path it
    /// does not contain.
    fn save_sitemap(&self, host: &str, sitemap: &Sitemap) -> Result<()>;

    fn load_processed_folders(&self) -> Result<ProcessedFolders>;
    fn save_processed_folders(&self, folders: &ProcessedFolders) -> Result<()>;

    /// Hosts with a saved sitemap.
    fn hosts(&self) -> Result<Vec<String>>;
}
