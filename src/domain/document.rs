use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A node in the shared Drive folder tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub mtime: DateTime<Utc>,
}

impl Folder {
    /// Folder name usable as a single path segment.
    pub fn path_segment(&self) -> String {
        sanitize_segment(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Drive metadata for one Google Doc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocMetadata {
    pub id: String,
    /// Web view link of the document.
    pub src: String,
    pub name: String,
    pub ctime: DateTime<Utc>,
    pub mtime: DateTime<Utc>,
    /// Time of the first published revision, if the document was ever published.
    pub ptime: Option<DateTime<Utc>>,
    pub author: Author,
}

/// Result of materializing a document on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedDoc {
    pub google_doc_id: String,
    pub title: String,
    pub slug: String,
    pub date: Option<DateTime<Utc>>,
    pub files: Vec<String>,
}

pub fn google_doc_url(doc_id: &str) -> String {
    format!("https://docs.google.com/document/d/{doc_id}/edit")
}

/// Slashes in Drive names would otherwise create extra directory levels.
pub fn sanitize_segment(name: &str) -> String {
    name.replace('/', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segment_replaces_slashes() {
        let folder = Folder {
            id: "f1".into(),
            name: "2024/2025".into(),
            mtime: Utc::now(),
        };
        assert_eq!(folder.path_segment(), "2024-2025");
    }

    #[test]
    fn test_google_doc_url() {
        assert_eq!(
            google_doc_url("1abc_DEF-2"),
            "https://docs.google.com/document/d/1abc_DEF-2/edit"
        );
    }
}
