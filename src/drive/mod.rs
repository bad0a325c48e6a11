pub mod api;
pub mod auth;
pub mod google;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{DocMetadata, Folder};

pub use google::GoogleDrive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Markdown,
    Pdf,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// The parts of a Docs API document the downloader needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocContent {
    pub title: String,
    /// Content URIs of inline images in document order; the markdown export
    /// labels them `image1`, `image2`, ...
    pub image_uris: Vec<String>,
}

impl DocContent {
    /// Content URI for a markdown image label such as `image3`.
    pub fn image_uri(&self, label: &str) -> Option<&str> {
        let n: usize = label.strip_prefix("image")?.parse().ok()?;
        self.image_uris
            .get(n.checked_sub(1)?)
            .map(String::as_str)
            .filter(|uri| !uri.is_empty())
    }
}

/// Read access to the shared Drive tree.
#[async_trait]
pub trait Drive: Send + Sync {
    /// Folders shared with the account; each one is a site.
    async fn list_shared_folders(&self) -> Result<Vec<Folder>>;

    async fn list_subfolders(&self, folder_id: &str) -> Result<Vec<Folder>>;

    /// Google Docs directly inside `folder_id`, with publish times resolved.
    async fn list_documents(&self, folder_id: &str) -> Result<Vec<DocMetadata>>;

    /// Timestamp of the most recent activity anywhere below `folder_id`.
    async fn latest_activity(&self, folder_id: &str) -> Result<Option<String>>;

    async fn document(&self, doc_id: &str) -> Result<DocContent>;

    async fn export(&self, doc_id: &str, format: ExportFormat) -> Result<Vec<u8>>;

    /// Plain GET of a URL handed out by the API, such as an image content URI.
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_uri_lookup() {
        let content = DocContent {
            title: "Doc".into(),
            image_uris: vec!["https://lh3.example/a".into(), String::new()],
        };
        assert_eq!(content.image_uri("image1"), Some("https://lh3.example/a"));
        assert_eq!(content.image_uri("image2"), None);
        assert_eq!(content.image_uri("image3"), None);
        assert_eq!(content.image_uri("image0"), None);
        assert_eq!(content.image_uri("logo"), None);
    }

    #[test]
    fn test_export_format() {
        assert_eq!(ExportFormat::Markdown.mime_type(), "text/markdown");
        assert_eq!(ExportFormat::Pdf.extension(), "pdf");
    }
}
