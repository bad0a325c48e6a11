use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::drive::{Drive, GoogleDrive};
use crate::publish::{Downloader, GoogleDocDownloader, Reconciler};
use crate::store::JsonStore;

pub struct AppContext {
    pub config: Config,
    pub store: Arc<JsonStore>,
    pub drive: Arc<dyn Drive>,
    pub reconciler: Reconciler,
}

impl AppContext {
    /// Connects to Google with the configured service account.
    pub fn new(config: Config) -> Result<Self> {
        let drive: Arc<dyn Drive> = Arc::new(GoogleDrive::from_config(&config.google)?);
        Ok(Self::with_drive(config, drive))
    }

    pub fn with_drive(config: Config, drive: Arc<dyn Drive>) -> Self {
        let downloader: Arc<dyn Downloader> = Arc::new(GoogleDocDownloader::new(drive.clone()));
        let reconciler = Reconciler::with_workers(drive.clone(), downloader, config.sync.workers);
        let store = Arc::new(JsonStore::new(&config.data_dir));

        Self {
            config,
            store,
            drive,
            reconciler,
        }
    }
}
