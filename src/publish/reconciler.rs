use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::{join_all, BoxFuture, FutureExt};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::domain::{DocMetadata, Folder, Sitemap, SitemapEntry};
use crate::drive::Drive;
use crate::publish::downloader::Downloader;

pub const DEFAULT_WORKERS: usize = 10;

/// Counters for one reconcile run.
#[derive(Debug, Default)]
pub struct ReconcileStats {
    downloaded: AtomicUsize,
    up_to_date: AtomicUsize,
    unpublished: AtomicUsize,
    failed: AtomicUsize,
}

impl ReconcileStats {
    pub fn downloaded(&self) -> usize {
        self.downloaded.load(Ordering::Relaxed)
    }

    pub fn up_to_date(&self) -> usize {
        self.up_to_date.load(Ordering::Relaxed)
    }

    pub fn unpublished(&self) -> usize {
        self.unpublished.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct Reconciled {
    pub sitemap: Sitemap,
    pub stats: ReconcileStats,
}

/// Accumulator shared by every task of one run, keyed by site path.
type Entries = DashMap<String, SitemapEntry>;

/// Latest recorded modification time per document id, taken from the
/// sitemap a run starts with.
type RecordedMtimes = HashMap<String, DateTime<Utc>>;

/// Brings a site's sitemap and files up to date with its Drive folder tree.
pub struct Reconciler {
    drive: Arc<dyn Drive>,
    downloader: Arc<dyn Downloader>,
    semaphore: Arc<Semaphore>,
}

impl Reconciler {
    pub fn new(drive: Arc<dyn Drive>, downloader: Arc<dyn Downloader>) -> Self {
        Self::with_workers(drive, downloader, DEFAULT_WORKERS)
    }

    pub fn with_workers(
        drive: Arc<dyn Drive>,
        downloader: Arc<dyn Downloader>,
        workers: usize,
    ) -> Self {
        Self {
            drive,
            downloader,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Walks `folder` recursively, downloading every published document that
    /// is newer than its sitemap entry. Files land in
    /// `{base_dir}/{folder name}/...`; site paths are relative to the folder,
    /// so a document at the top level becomes `/{slug}`.
    ///
    /// Entries are only ever added or replaced. Failures are logged and never
    /// abort sibling work.
    pub async fn reconcile(&self, folder: &Folder, base_dir: &Path, sitemap: Sitemap) -> Reconciled {
        let recorded = recorded_mtimes(&sitemap);
        let entries: Entries = sitemap.into_iter().collect();
        let stats = ReconcileStats::default();
        let root_dir = base_dir.join(folder.path_segment());

        self.reconcile_folder(folder, root_dir, String::new(), &recorded, &entries, &stats)
            .await;

        info!(
            folder = %folder.name,
            downloaded = stats.downloaded(),
            up_to_date = stats.up_to_date(),
            unpublished = stats.unpublished(),
            failed = stats.failed(),
            "Reconciled folder"
        );

        Reconciled {
            sitemap: entries.into_iter().collect(),
            stats,
        }
    }

    fn reconcile_folder<'a>(
        &'a self,
        folder: &'a Folder,
        dir: PathBuf,
        site_prefix: String,
        recorded: &'a RecordedMtimes,
        entries: &'a Entries,
        stats: &'a ReconcileStats,
    ) -> BoxFuture<'a, ()> {
        async move {
            debug!(folder = %folder.name, dir = %dir.display(), "Processing folder");

            let docs = match self.drive.list_documents(&folder.id).await {
                Ok(docs) => docs,
                Err(e) => {
                    warn!(folder = %folder.name, error = %e, "Failed to list documents");
                    Vec::new()
                }
            };

            join_all(docs.iter().map(|doc| {
                self.reconcile_document(doc, &dir, &site_prefix, recorded, entries, stats)
            }))
            .await;

            let subfolders = match self.drive.list_subfolders(&folder.id).await {
                Ok(subfolders) => subfolders,
                Err(e) => {
                    warn!(folder = %folder.name, error = %e, "Failed to list subfolders");
                    Vec::new()
                }
            };

            join_all(subfolders.iter().map(|sub| {
                let segment = sub.path_segment();
                self.reconcile_folder(
                    sub,
                    dir.join(&segment),
                    format!("{site_prefix}/{segment}"),
                    recorded,
                    entries,
                    stats,
                )
            }))
            .await;
        }
        .boxed()
    }

    async fn reconcile_document(
        &self,
        doc: &DocMetadata,
        dir: &Path,
        site_prefix: &str,
        recorded: &RecordedMtimes,
        entries: &Entries,
        stats: &ReconcileStats,
    ) {
        if is_up_to_date(recorded, doc) {
            debug!(doc = %doc.name, "Up to date");
            stats.up_to_date.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let Ok(_permit) = self.semaphore.acquire().await else {
            return;
        };

        match self.downloader.download(doc, dir).await {
            Ok(Some(downloaded)) if downloaded.slug.is_empty() => {
                warn!(doc = %doc.name, doc_id = %doc.id, "Downloaded document has no slug");
                stats.failed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Some(downloaded)) => {
                let path = format!("{site_prefix}/{}", downloaded.slug);
                let entry = SitemapEntry::from_download(
                    path.clone(),
                    doc,
                    downloaded.title,
                    downloaded.date,
                    downloaded.files,
                );
                entries.insert(path, entry);
                stats.downloaded.fetch_add(1, Ordering::Relaxed);
            }
            Ok(None) => {
                stats.unpublished.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                warn!(doc = %doc.name, doc_id = %doc.id, error = %e, "Failed to download document");
                stats.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

fn recorded_mtimes(sitemap: &Sitemap) -> RecordedMtimes {
    let mut recorded = RecordedMtimes::with_capacity(sitemap.len());
    for entry in sitemap.values() {
        recorded
            .entry(entry.google_doc_id.clone())
            .and_modify(|mtime| *mtime = (*mtime).max(entry.mtime))
            .or_insert(entry.mtime);
    }
    recorded
}

/// A document is current when it was recorded at or after its Drive
/// modification time.
fn is_up_to_date(recorded: &RecordedMtimes, doc: &DocMetadata) -> bool {
    recorded.get(&doc.id).is_some_and(|mtime| *mtime >= doc.mtime)
}
