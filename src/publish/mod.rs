//! Mirroring Drive folders to disk.
//!
//! The [`Reconciler`] walks a site's folder tree and hands stale published
//! documents to a [`Downloader`], which writes the markdown, images and PDF.

pub mod downloader;
pub mod reconciler;
pub mod slug;
pub mod xattr;

pub use downloader::{Downloader, GoogleDocDownloader};
pub use reconciler::{ReconcileStats, Reconciled, Reconciler, DEFAULT_WORKERS};
pub use slug::slugify;
