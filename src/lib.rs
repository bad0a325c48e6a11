//! # Quire
//!
//! Publishes folders of Google Docs as websites.
//!
//! ## Architecture
//!
//! Every folder shared with the service account is one site, named after
//! its host:
//!
//! ```text
//! Drive → Reconciler → Downloader → {data_dir}/{host}/ + sitemap → Server
//! ```
//!
//! - [`drive`]: Drive, Docs and Drive Activity clients
//! - [`publish`]: Recursive folder reconciliation and document download
//! - [`markdown`]: Link rewriting, embeds and footer parsing at render time
//! - [`server`]: Host-routed HTTP server with an RSS feed per site
//!
//! ## Quick Start
//!
//! ```bash
//! # Mirror every shared folder
//! quire sync
//!
//! # Mirror one folder
//! quire publish example.com
//!
//! # Serve the mirrored sites
//! quire serve --port 8000
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the Drive
/// client, the reconciler and the sitemap store.
pub mod app;

/// Command-line interface using clap.
///
/// - `sync` - Mirror every shared folder that changed
/// - `publish <folder>` - Mirror one folder
/// - `inspect <doc id>` - Show a document's images and pages
/// - `list [--host]` - List mirrored pages
/// - `serve [--port]` - Run the HTTP server
pub mod cli;

/// Configuration loaded from `~/.config/quire/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Folder`](domain::Folder) and [`DocMetadata`](domain::DocMetadata): Drive listings
/// - [`SitemapEntry`](domain::SitemapEntry): One published page
/// - [`FooterItem`](domain::FooterItem): A parsed footer line
pub mod domain;

/// Google API access.
///
/// - [`Drive`](drive::Drive): Async trait over the Google APIs used
/// - [`GoogleDrive`](drive::GoogleDrive): reqwest implementation with service account auth
pub mod drive;

/// Markdown transforms applied when a page is served.
pub mod markdown;

/// Mirroring of Drive folders to disk.
pub mod publish;

/// HTTP server for the mirrored sites.
pub mod server;

/// JSON persistence of sitemaps and sync state.
///
/// - [`SitemapStore`](store::SitemapStore): Trait defining storage operations
/// - [`JsonStore`](store::JsonStore): One JSON file per host
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
