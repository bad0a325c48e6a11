//! RSS 2.0 feed of a host's blog posts.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use rss::{validation::Validate, ChannelBuilder, GuidBuilder, ItemBuilder};
use tracing::warn;

use crate::app::{QuireError, Result};
use crate::domain::{Sitemap, SitemapEntry};
use crate::server::render::markdown_to_html;

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>").unwrap()
});

/// Entries under `blog_prefix` that carry a date, newest first.
pub fn feed_entries<'a>(sitemap: &'a Sitemap, blog_prefix: &str) -> Vec<&'a SitemapEntry> {
    let mut entries: Vec<&SitemapEntry> = sitemap
        .values()
        .filter(|e| e.path.starts_with(blog_prefix) && e.display_date().is_some())
        .collect();
    entries.sort_by(|a, b| b.display_date().cmp(&a.display_date()));
    entries
}

pub fn strip_scripts_and_styles(html: &str) -> String {
    SCRIPT_OR_STYLE.replace_all(html, "").trim().to_string()
}

/// Rendered HTML of an entry's markdown file, or empty when unreadable.
async fn entry_content(host_dir: &Path, entry: &SitemapEntry) -> String {
    let path = host_dir.join(format!("{}.md", entry.path.trim_start_matches('/')));
    match tokio::fs::read_to_string(&path).await {
        Ok(markdown) => strip_scripts_and_styles(&markdown_to_html(&markdown)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read feed entry content");
            String::new()
        }
    }
}

fn entry_title(entry: &SitemapEntry) -> String {
    if entry.title.is_empty() {
        entry.path.rsplit('/').next().unwrap_or_default().to_string()
    } else {
        entry.title.clone()
    }
}

pub async fn build_feed(
    host: &str,
    sitemap: &Sitemap,
    host_dir: &Path,
    blog_prefix: &str,
) -> Result<String> {
    let base_url = format!("https://{host}");
    let entries = feed_entries(sitemap, blog_prefix);

    let mut items = Vec::with_capacity(entries.len());
    for entry in &entries {
        let link = format!("{base_url}{}", entry.path);
        let content = entry_content(host_dir, entry).await;
        items.push(
            ItemBuilder::default()
                .title(Some(entry_title(entry)))
                .link(Some(link.clone()))
                .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
                .pub_date(entry.display_date().map(|d| d.to_rfc2822()))
                .description(Some(content))
                .build(),
        );
    }

    let channel = ChannelBuilder::default()
        .title(host.to_string())
        .link(base_url)
        .description(format!("RSS feed for {host}"))
        .language(Some("en".to_string()))
        .last_build_date(
            entries
                .first()
                .and_then(|e| e.display_date())
                .map(|d| d.to_rfc2822()),
        )
        .generator(Some(concat!("quire ", env!("CARGO_PKG_VERSION")).to_string()))
        .items(items)
        .build();

    channel
        .validate()
        .map_err(|e| QuireError::Other(format!("RSS validation failed: {e}")))?;
    Ok(channel.to_string())
}
