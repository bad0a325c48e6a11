use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

use crate::app::{AppContext, QuireError, Result};
use crate::config::Config;
use crate::domain::{find_by_doc_id, Folder};
use crate::publish::ReconcileStats;
use crate::store::{JsonStore, SitemapStore};

/// Outcome of syncing one shared folder.
#[derive(Debug)]
pub enum SiteSync {
    /// No Drive activity since the last sync.
    Unchanged,
    Synced {
        /// Activity timestamp to record for the folder.
        activity: String,
        stats: ReconcileStats,
    },
}

/// Mirrors one site: loads its sitemap, reconciles it against Drive and
/// saves the result. `last_activity` is the timestamp recorded by the
/// previous sync.
pub async fn sync_site(
    ctx: &AppContext,
    folder: &Folder,
    last_activity: Option<&str>,
) -> Result<SiteSync> {
    let activity = match ctx.drive.latest_activity(&folder.id).await {
        Ok(activity) => activity,
        Err(e) => {
            warn!(folder = %folder.name, error = %e, "Failed to read folder activity");
            None
        }
    };

    if activity.is_some() && activity.as_deref() == last_activity {
        info!(folder = %folder.name, "No changes since last sync");
        return Ok(SiteSync::Unchanged);
    }

    let host = folder.path_segment();
    let sitemap = ctx.store.load_sitemap(&host)?;
    let reconciled = ctx
        .reconciler
        .reconcile(folder, &ctx.config.data_dir, sitemap)
        .await;
    ctx.store.save_sitemap(&host, &reconciled.sitemap)?;

    Ok(SiteSync::Synced {
        activity: activity.unwrap_or_else(|| Utc::now().to_rfc3339()),
        stats: reconciled.stats,
    })
}

pub async fn sync_all(ctx: &AppContext) -> Result<()> {
    let start = Instant::now();
    let mut processed = ctx.store.load_processed_folders()?;
    let folders = ctx.drive.list_shared_folders().await?;

    if folders.is_empty() {
        println!("No folders shared with the service account");
        return Ok(());
    }

    println!("Syncing {} sites...", folders.len());

    let results = join_all(
        folders
            .iter()
            .map(|folder| sync_site(ctx, folder, processed.get(&folder.id).map(String::as_str))),
    )
    .await;

    let mut errors = 0;
    for (folder, result) in folders.iter().zip(results) {
        match result {
            Ok(SiteSync::Unchanged) => println!("  {}: unchanged", folder.name),
            Ok(SiteSync::Synced { activity, stats }) => {
                println!(
                    "  {}: {} downloaded, {} up to date, {} failed",
                    folder.name,
                    stats.downloaded(),
                    stats.up_to_date(),
                    stats.failed()
                );
                processed.insert(folder.id.clone(), activity);
            }
            Err(e) => {
                errors += 1;
                eprintln!("  Error syncing {}: {}", folder.name, e);
            }
        }
    }

    ctx.store.save_processed_folders(&processed)?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "Sync finished");
    println!(
        "Sync complete in {:.1}s, {} errors",
        start.elapsed().as_secs_f64(),
        errors
    );
    Ok(())
}

/// Mirrors the shared folder named `name`, ignoring the activity record.
pub async fn publish_folder(ctx: &AppContext, name: &str) -> Result<()> {
    let folders = ctx.drive.list_shared_folders().await?;
    let folder = folders
        .into_iter()
        .find(|f| f.name == name)
        .ok_or_else(|| QuireError::FolderNotFound(name.to_string()))?;

    match sync_site(ctx, &folder, None).await? {
        SiteSync::Synced { activity, stats } => {
            let mut processed = ctx.store.load_processed_folders()?;
            processed.insert(folder.id.clone(), activity);
            ctx.store.save_processed_folders(&processed)?;
            println!(
                "Published {}: {} downloaded, {} up to date, {} unpublished, {} failed",
                folder.name,
                stats.downloaded(),
                stats.up_to_date(),
                stats.unpublished(),
                stats.failed()
            );
        }
        SiteSync::Unchanged => println!("{} is unchanged", folder.name),
    }
    Ok(())
}

pub async fn inspect_document(ctx: &AppContext, doc_id: &str) -> Result<()> {
    let content = ctx.drive.document(doc_id).await?;
    println!("Title: {}", content.title);

    if content.image_uris.is_empty() {
        println!("No inline images");
    } else {
        println!("Inline images:");
        for (i, uri) in content.image_uris.iter().enumerate() {
            let uri = if uri.is_empty() { "(no content uri)" } else { uri };
            println!("  image{}: {}", i + 1, uri);
        }
    }

    let mut published = false;
    for host in ctx.store.hosts()? {
        let sitemap = ctx.store.load_sitemap(&host)?;
        if let Some(entry) = find_by_doc_id(&sitemap, doc_id) {
            println!("Published at https://{}{}", host, entry.path);
            published = true;
        }
    }
    if !published {
        println!("Not in any sitemap");
    }

    Ok(())
}

pub fn list_pages(config: &Config, host: Option<&str>) -> Result<()> {
    let store = JsonStore::new(&config.data_dir);
    let hosts = match host {
        Some(host) => vec![host.to_string()],
        None => store.hosts()?,
    };

    if hosts.is_empty() {
        println!("No sites in {}", config.data_dir.display());
        return Ok(());
    }

    for host in hosts {
        let sitemap = store.load_sitemap(&host)?;
        println!("{} ({} pages)", host, sitemap.len());
        for entry in sitemap.values() {
            let date = entry
                .display_date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "          ".to_string());
            println!("  {}  {}  {}", date, entry.path, entry.title);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{folder, published_doc, FakeDrive};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn context(drive: Arc<FakeDrive>) -> (AppContext, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        (AppContext::with_drive(config, drive), dir)
    }

    fn drive() -> Arc<FakeDrive> {
        let drive = Arc::new(FakeDrive::default());
        drive.add_folder(None, folder("site1", "example.com"));
        drive.add_document("site1", published_doc("idx", "index", 10), "# Home\n");
        drive.set_activity("site1", "2024-05-01T10:00:00.000Z");
        drive
    }

    #[tokio::test]
    async fn test_sync_all_writes_sitemap_and_activity() {
        let drive = drive();
        let (ctx, dir) = context(drive.clone());

        sync_all(&ctx).await.unwrap();

        let sitemap = ctx.store.load_sitemap("example.com").unwrap();
        assert!(sitemap.contains_key("/index"));
        assert!(dir.path().join("example.com/index.md").exists());

        let processed = ctx.store.load_processed_folders().unwrap();
        assert_eq!(processed["site1"], "2024-05-01T10:00:00.000Z");
    }

    #[tokio::test]
    async fn test_unchanged_activity_skips_site() {
        let drive = drive();
        let (ctx, _dir) = context(drive.clone());

        sync_all(&ctx).await.unwrap();
        let listed = drive.list_calls.load(Ordering::SeqCst);

        sync_all(&ctx).await.unwrap();
        assert_eq!(drive.list_calls.load(Ordering::SeqCst), listed);

        drive.set_activity("site1", "2024-05-02T10:00:00.000Z");
        sync_all(&ctx).await.unwrap();
        assert!(drive.list_calls.load(Ordering::SeqCst) > listed);
    }

    #[tokio::test]
    async fn test_missing_activity_always_syncs() {
        let drive = Arc::new(FakeDrive::default());
        let site = folder("site1", "example.com");
        drive.add_folder(None, site.clone());
        let (ctx, _dir) = context(drive);

        let result = sync_site(&ctx, &site, None).await.unwrap();
        assert!(matches!(result, SiteSync::Synced { .. }));
    }

    #[tokio::test]
    async fn test_publish_unknown_folder() {
        let (ctx, _dir) = context(drive());
        let err = publish_folder(&ctx, "missing.org").await.unwrap_err();
        assert!(matches!(err, QuireError::FolderNotFound(name) if name == "missing.org"));
    }

    #[tokio::test]
    async fn test_publish_folder_by_name() {
        let drive = drive();
        let (ctx, dir) = context(drive.clone());

        publish_folder(&ctx, "example.com").await.unwrap();
        assert!(dir.path().join("example.com/index.pdf").exists());
        assert_eq!(
            ctx.store.load_processed_folders().unwrap()["site1"],
            "2024-05-01T10:00:00.000Z"
        );
    }

    #[tokio::test]
    async fn test_inspect_and_list() {
        let drive = drive();
        let (ctx, _dir) = context(drive);
        sync_all(&ctx).await.unwrap();

        inspect_document(&ctx, "idx").await.unwrap();
        assert!(inspect_document(&ctx, "unknown").await.is_err());
        list_pages(&ctx.config, None).unwrap();
        list_pages(&ctx.config, Some("example.com")).unwrap();
    }
}
