use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::app::{QuireError, Result};
use crate::config::GoogleConfig;
use crate::domain::{DocMetadata, Folder};
use crate::drive::api::{
    error_message, first_published, ActivityQueryResponse, Document, DriveFile, FileList,
    RevisionList, DOCUMENT_MIME_TYPE, FOLDER_MIME_TYPE,
};
use crate::drive::auth::{ServiceAccountKey, TokenProvider};
use crate::drive::{DocContent, Drive, ExportFormat};

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const DOCS_URL: &str = "https://docs.googleapis.com/v1/documents";
const ACTIVITY_URL: &str = "https://driveactivity.googleapis.com/v2/activity:query";

const DOCUMENT_FIELDS: &str = "id, name, webViewLink, createdTime, modifiedTime, owners";
const FOLDER_FIELDS: &str = "id, name, modifiedTime";

/// Drive client authenticated as a service account.
pub struct GoogleDrive {
    client: Client,
    auth: TokenProvider,
    page_size: u32,
}

impl GoogleDrive {
    pub fn new(key: ServiceAccountKey, config: &GoogleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("quire/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            auth: TokenProvider::new(key, client.clone())?,
            client,
            page_size: config.page_size,
        })
    }

    pub fn from_config(config: &GoogleConfig) -> Result<Self> {
        let path = config.service_account_key_path.as_deref().ok_or_else(|| {
            QuireError::Config("google.service_account_key_path is not set".to_string())
        })?;
        Self::new(ServiceAccountKey::from_file(path)?, config)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>> {
        let token = self.auth.token().await?;
        let response = request
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(QuireError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let body = self.send(self.client.get(url)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Runs a files.list query, following `nextPageToken` to the end.
    async fn list_files(&self, query: &str, fields: &str) -> Result<Vec<DriveFile>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = Url::parse(DRIVE_FILES_URL)?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs
                    .append_pair("q", query)
                    .append_pair("fields", &format!("nextPageToken, files({fields})"))
                    .append_pair("pageSize", &self.page_size.to_string())
                    .append_pair("supportsAllDrives", "true")
                    .append_pair("includeItemsFromAllDrives", "true");
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            let page: FileList = self.get_json(url).await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(files)
    }

    async fn list_folders(&self, query: &str) -> Result<Vec<Folder>> {
        let files = self.list_files(query, FOLDER_FIELDS).await?;
        Ok(files.into_iter().map(DriveFile::into_folder).collect())
    }

    /// Publish time of a document, or `None` when it was never published or
    /// its revisions cannot be read.
    async fn published_time(&self, file: &DriveFile) -> Option<DateTime<Utc>> {
        match self.revisions(&file.id).await {
            Ok(ptime) => ptime,
            Err(QuireError::Api { status: 403, .. }) => {
                info!(
                    doc = %file.name,
                    "Cannot read revisions (insufficient permissions), treating as unpublished"
                );
                None
            }
            Err(e) => {
                warn!(doc = %file.name, error = %e, "Failed to list revisions");
                None
            }
        }
    }

    async fn revisions(&self, doc_id: &str) -> Result<Option<DateTime<Utc>>> {
        let mut revisions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = Url::parse(&format!("{DRIVE_FILES_URL}/{doc_id}/revisions"))?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair(
                    "fields",
                    "nextPageToken, revisions(modifiedTime, published, publishedLink)",
                );
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            let page: RevisionList = self.get_json(url).await?;
            revisions.extend(page.revisions);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(first_published(&revisions))
    }
}

/// Drive query strings quote values with single quotes.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl Drive for GoogleDrive {
    async fn list_shared_folders(&self) -> Result<Vec<Folder>> {
        let query = format!("mimeType='{FOLDER_MIME_TYPE}' and sharedWithMe and trashed=false");
        let folders = self.list_folders(&query).await?;
        debug!(count = folders.len(), "Listed shared folders");
        Ok(folders)
    }

    async fn list_subfolders(&self, folder_id: &str) -> Result<Vec<Folder>> {
        let query = format!(
            "'{}' in parents and mimeType='{FOLDER_MIME_TYPE}' and trashed=false",
            escape_query(folder_id)
        );
        self.list_folders(&query).await
    }

    async fn list_documents(&self, folder_id: &str) -> Result<Vec<DocMetadata>> {
        let query = format!(
            "'{}' in parents and mimeType='{DOCUMENT_MIME_TYPE}' and trashed=false",
            escape_query(folder_id)
        );
        let files = self.list_files(&query, DOCUMENT_FIELDS).await?;

        let docs = join_all(files.into_iter().map(|file| async move {
            let ptime = self.published_time(&file).await;
            file.into_doc_metadata(ptime)
        }))
        .await;

        debug!(folder_id, count = docs.len(), "Listed documents");
        Ok(docs)
    }

    async fn latest_activity(&self, folder_id: &str) -> Result<Option<String>> {
        let body = serde_json::json!({
            "ancestorName": format!("items/{folder_id}"),
            "pageSize": 1,
        });
        let request = self
            .client
            .post(ACTIVITY_URL)
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&body)?);

        let response: ActivityQueryResponse = serde_json::from_slice(&self.send(request).await?)?;
        Ok(response
            .activities
            .first()
            .and_then(|a| a.time())
            .map(String::from))
    }

    async fn document(&self, doc_id: &str) -> Result<DocContent> {
        let url = Url::parse(&format!("{DOCS_URL}/{doc_id}"))?;
        let document: Document = self.get_json(url).await?;
        Ok(document.into_content())
    }

    async fn export(&self, doc_id: &str, format: ExportFormat) -> Result<Vec<u8>> {
        let mut url = Url::parse(&format!("{DRIVE_FILES_URL}/{doc_id}/export"))?;
        url.query_pairs_mut()
            .append_pair("mimeType", format.mime_type());
        self.send(self.client.get(url)).await
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(QuireError::Api {
                status: response.status().as_u16(),
                message: format!("Failed to download {url}"),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
