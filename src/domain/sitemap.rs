use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DocMetadata;

/// Site path → entry. Ordered so the persisted JSON is stable between runs.
pub type Sitemap = BTreeMap<String, SitemapEntry>;

/// One published document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub google_doc_id: String,
    pub path: String,
    pub src: String,
    pub ctime: DateTime<Utc>,
    pub mtime: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ptime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_date: Option<DateTime<Utc>>,
    pub title: String,
    #[serde(default)]
    pub files: Vec<String>,
}

impl SitemapEntry {
    pub fn from_download(
        path: String,
        doc: &DocMetadata,
        title: String,
        custom_date: Option<DateTime<Utc>>,
        files: Vec<String>,
    ) -> Self {
        Self {
            google_doc_id: doc.id.clone(),
            path,
            src: doc.src.clone(),
            ctime: doc.ctime,
            mtime: doc.mtime,
            ptime: doc.ptime,
            custom_date,
            title,
            files,
        }
    }

    /// Date shown in feeds: the date written in the document wins over the
    /// publish time.
    pub fn display_date(&self) -> Option<DateTime<Utc>> {
        self.custom_date.or(self.ptime)
    }

    /// True when the recorded version is at least as recent as `mtime`.
    pub fn is_current(&self, mtime: DateTime<Utc>) -> bool {
        self.mtime >= mtime
    }
}

/// Finds the entry recorded for a document id, if any.
pub fn find_by_doc_id<'a>(sitemap: &'a Sitemap, doc_id: &str) -> Option<&'a SitemapEntry> {
    sitemap.values().find(|entry| entry.google_doc_id == doc_id)
}
