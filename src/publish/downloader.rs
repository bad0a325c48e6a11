use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::app::Result;
use crate::domain::{google_doc_url, DocMetadata, DownloadedDoc};
use crate::drive::{DocContent, Drive, ExportFormat};
use crate::markdown::extract_date;
use crate::markdown::images::{find_inline_images, relink_image, InlineImage};
use crate::publish::slug::slugify;
use crate::publish::xattr::tag_source_url;

const IMAGES_DIR: &str = "images";

/// Materializes one document into a directory.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Returns `None` when the document is not published; nothing is written.
    async fn download(&self, doc: &DocMetadata, target_dir: &Path)
        -> Result<Option<DownloadedDoc>>;
}

/// Writes `{slug}.md`, `images/{slug}_{label}.{ext}` and `{slug}.pdf`.
pub struct GoogleDocDownloader {
    drive: Arc<dyn Drive>,
}

impl GoogleDocDownloader {
    pub fn new(drive: Arc<dyn Drive>) -> Self {
        Self { drive }
    }

    /// Writes each inline image to `images/` and relinks the markdown to it.
    /// Images that cannot be fetched or decoded keep their inline definition.
    async fn extract_images(
        &self,
        mut markdown: String,
        slug: &str,
        target_dir: &Path,
        content: &DocContent,
    ) -> (String, Vec<PathBuf>) {
        let images = find_inline_images(&markdown);
        if images.is_empty() {
            return (markdown, Vec::new());
        }

        let images_dir = target_dir.join(IMAGES_DIR);
        if let Err(e) = tokio::fs::create_dir_all(&images_dir).await {
            warn!(dir = %images_dir.display(), error = %e, "Failed to create images directory");
            return (markdown, Vec::new());
        }

        let mut written = Vec::new();
        for image in &images {
            let bytes = match self.image_bytes(image, content).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(image = %image.alt, error = %e, "Skipping image");
                    continue;
                }
            };

            let file_name = image.file_name(slug);
            let path = images_dir.join(&file_name);
            if let Err(e) = tokio::fs::write(&path, bytes).await {
                warn!(path = %path.display(), error = %e, "Failed to write image");
                continue;
            }

            markdown = relink_image(&markdown, image, &format!("./{IMAGES_DIR}/{file_name}"));
            written.push(path);
        }

        debug!(count = written.len(), "Extracted images");
        (markdown, written)
    }

    /// Prefers the full resolution original from the Docs API over the
    /// embedded copy in the export.
    async fn image_bytes(&self, image: &InlineImage, content: &DocContent) -> Result<Vec<u8>> {
        match content.image_uri(&image.alt) {
            Some(uri) => self.drive.download(uri).await,
            None => image.decode(),
        }
    }
}

async fn write_file(path: &Path, bytes: &[u8], source_url: &str) -> Result<()> {
    tokio::fs::write(path, bytes).await?;
    tag_source_url(path, source_url).await;
    Ok(())
}

#[async_trait]
impl Downloader for GoogleDocDownloader {
    async fn download(
        &self,
        doc: &DocMetadata,
        target_dir: &Path,
    ) -> Result<Option<DownloadedDoc>> {
        if doc.ptime.is_none() {
            info!(doc = %doc.name, "Document is not published, skipping");
            return Ok(None);
        }

        let source_url = google_doc_url(&doc.id);
        info!(doc = %doc.name, dir = %target_dir.display(), "Downloading document");
        tokio::fs::create_dir_all(target_dir).await?;

        let content = match self.drive.document(&doc.id).await {
            Ok(content) => content,
            Err(e) => {
                warn!(doc = %doc.name, error = %e, "Failed to read document, using Drive name");
                DocContent::default()
            }
        };
        let title = [content.title.as_str(), doc.name.as_str(), doc.id.as_str()]
            .into_iter()
            .find(|t| !t.trim().is_empty())
            .unwrap_or_default()
            .to_string();
        let slug = match slugify(&title) {
            s if s.is_empty() => doc.id.clone(),
            s => s,
        };

        let exported = self.drive.export(&doc.id, ExportFormat::Markdown).await?;
        let markdown = String::from_utf8_lossy(&exported).into_owned();
        let (markdown, images) = self
            .extract_images(markdown, &slug, target_dir, &content)
            .await;

        let md_path = target_dir.join(format!("{slug}.{}", ExportFormat::Markdown.extension()));
        write_file(&md_path, markdown.as_bytes(), &source_url).await?;

        let pdf = self.drive.export(&doc.id, ExportFormat::Pdf).await?;
        let pdf_path = target_dir.join(format!("{slug}.{}", ExportFormat::Pdf.extension()));
        write_file(&pdf_path, &pdf, &source_url).await?;

        let files = std::iter::once(md_path)
            .chain(images)
            .chain(std::iter::once(pdf_path))
            .map(|p| p.display().to_string())
            .collect();

        Ok(Some(DownloadedDoc {
            google_doc_id: doc.id.clone(),
            title,
            slug,
            date: extract_date(&markdown),
            files,
        }))
    }
}
