use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::domain::Sitemap;

/// `[anchor](https://docs.google.com/document/d/<id>/edit...)`
static DOC_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[([^\]\n]*)\]\((https://docs\.google\.com/document/d/([a-zA-Z0-9_-]+)/edit(?:[?#][^)\s]*)?)\)",
    )
    .unwrap()
});

static DOC_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://docs\.google\.com/document/d/([a-zA-Z0-9_-]+)").unwrap()
});

/// Extracts the document id from any Google Docs URL.
pub fn google_doc_id(url: &str) -> Option<&str> {
    DOC_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Document id → site path.
///
/// Entries are visited in site path order and the first path recorded for an
/// id is kept. A second path for the same id means the sitemap is
/// inconsistent; it is reported, not resolved.
pub fn index_by_doc_id(sitemap: &Sitemap) -> HashMap<&str, &str> {
    let mut index: HashMap<&str, &str> = HashMap::with_capacity(sitemap.len());
    for (path, entry) in sitemap {
        match index.get(entry.google_doc_id.as_str()) {
            Some(existing) => warn!(
                doc_id = %entry.google_doc_id,
                kept = %existing,
                ignored = %path,
                "Document appears under more than one site path"
            ),
            None => {
                index.insert(entry.google_doc_id.as_str(), path.as_str());
            }
        }
    }
    index
}

/// Points links to known Google Docs at their site path. Links to documents
/// missing from the sitemap are left untouched.
pub fn rewrite_doc_links(markdown: &str, sitemap: &Sitemap) -> String {
    let index = index_by_doc_id(sitemap);

    DOC_LINK
        .replace_all(markdown, |caps: &Captures| {
            let anchor = &caps[1];
            let doc_id = &caps[3];
            match index.get(doc_id) {
                Some(path) => format!("[{anchor}]({path})"),
                None => {
                    debug!(doc_id, link = &caps[0], "No sitemap entry for linked document");
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}
