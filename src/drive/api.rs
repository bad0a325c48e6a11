//! Wire types for the Drive v3, Docs v1 and Drive Activity v2 APIs.
//!
//! Only the fields the mirror reads are modelled; everything else in the
//! responses is ignored.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{google_doc_url, Author, DocMetadata, Folder};
use crate::drive::DocContent;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
pub const DOCUMENT_MIME_TYPE: &str = "application/vnd.google-apps.document";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub web_view_link: Option<String>,
    pub created_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub owners: Vec<Owner>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub display_name: Option<String>,
    pub photo_link: Option<String>,
}

impl DriveFile {
    pub fn into_folder(self) -> Folder {
        Folder {
            id: self.id,
            name: self.name,
            mtime: self.modified_time.unwrap_or(DateTime::UNIX_EPOCH),
        }
    }

    /// Missing timestamps fall back to the Unix epoch so the document is
    /// always considered stale rather than silently skipped.
    pub fn into_doc_metadata(self, ptime: Option<DateTime<Utc>>) -> DocMetadata {
        let mtime = self.modified_time.unwrap_or(DateTime::UNIX_EPOCH);
        let author = self
            .owners
            .into_iter()
            .next()
            .map(|owner| Author {
                name: owner.display_name,
                avatar: owner.photo_link,
            })
            .unwrap_or_default();

        DocMetadata {
            src: self.web_view_link.unwrap_or_else(|| google_doc_url(&self.id)),
            id: self.id,
            name: self.name,
            ctime: self.created_time.unwrap_or(mtime),
            mtime,
            ptime,
            author,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionList {
    #[serde(default)]
    pub revisions: Vec<Revision>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub modified_time: Option<DateTime<Utc>>,
    pub published_link: Option<String>,
    #[serde(default)]
    pub published: bool,
}

impl Revision {
    pub fn is_published(&self) -> bool {
        self.published || self.published_link.is_some()
    }
}

/// Modification time of the first published revision.
pub fn first_published(revisions: &[Revision]) -> Option<DateTime<Utc>> {
    revisions
        .iter()
        .find(|r| r.is_published())
        .and_then(|r| r.modified_time)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Body,
    #[serde(default)]
    pub inline_objects: HashMap<String, InlineObject>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

#[derive(Debug, Deserialize)]
pub struct StructuralElement {
    pub paragraph: Option<Paragraph>,
}

#[derive(Debug, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphElement {
    pub inline_object_element: Option<InlineObjectElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineObjectElement {
    pub inline_object_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineObject {
    pub inline_object_properties: Option<InlineObjectProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineObjectProperties {
    pub embedded_object: Option<EmbeddedObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedObject {
    pub image_properties: Option<ImageProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProperties {
    pub content_uri: Option<String>,
}

impl Document {
    /// Inline image URIs are listed in the order the images appear in the
    /// body, matching the `imageN` labels of the markdown export. An image
    /// without a content URI keeps its slot as an empty string.
    pub fn into_content(self) -> DocContent {
        let image_uris = self
            .body
            .content
            .iter()
            .filter_map(|el| el.paragraph.as_ref())
            .flat_map(|p| p.elements.iter())
            .filter_map(|el| el.inline_object_element.as_ref())
            .map(|el| {
                self.inline_objects
                    .get(&el.inline_object_id)
                    .and_then(|obj| obj.inline_object_properties.as_ref())
                    .and_then(|props| props.embedded_object.as_ref())
                    .and_then(|emb| emb.image_properties.as_ref())
                    .and_then(|img| img.content_uri.clone())
                    .unwrap_or_default()
            })
            .collect();

        DocContent {
            title: self.title,
            image_uris,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ActivityQueryResponse {
    #[serde(default)]
    pub activities: Vec<DriveActivity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveActivity {
    pub timestamp: Option<String>,
    pub time_range: Option<TimeRange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub end_time: Option<String>,
}

impl DriveActivity {
    pub fn time(&self) -> Option<&str> {
        self.timestamp
            .as_deref()
            .or_else(|| self.time_range.as_ref()?.end_time.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,
}

/// Best-effort extraction of the `error.message` field from an API error body.
pub fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned())
}
