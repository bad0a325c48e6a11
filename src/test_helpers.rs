//! Shared test utilities: an in-memory [`Drive`] and document builders.
//!
//! ```rust
//! let drive = FakeDrive::default();
//! drive.add_folder(None, folder("root", "example.com"));
//! drive.add_document("root", published_doc("d1", "Hello", 100), "# Hello\n");
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::app::{QuireError, Result};
use crate::domain::{google_doc_url, Author, DocMetadata, Folder};
use crate::drive::{DocContent, Drive, ExportFormat};

pub fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
}

pub fn folder(id: &str, name: &str) -> Folder {
    Folder {
        id: id.to_string(),
        name: name.to_string(),
        mtime: ts(0),
    }
}

pub fn published_doc(id: &str, name: &str, mtime: i64) -> DocMetadata {
    DocMetadata {
        id: id.to_string(),
        src: google_doc_url(id),
        name: name.to_string(),
        ctime: ts(0),
        mtime: ts(mtime),
        ptime: Some(ts(1)),
        author: Author::default(),
    }
}

pub fn draft_doc(id: &str, name: &str, mtime: i64) -> DocMetadata {
    DocMetadata {
        ptime: None,
        ..published_doc(id, name, mtime)
    }
}

#[derive(Default)]
struct Tree {
    shared: Vec<Folder>,
    subfolders: HashMap<String, Vec<Folder>>,
    documents: HashMap<String, Vec<DocMetadata>>,
    content: HashMap<String, DocContent>,
    exports: HashMap<(String, ExportFormat), Vec<u8>>,
    urls: HashMap<String, Vec<u8>>,
    activity: HashMap<String, String>,
    broken_folders: HashSet<String>,
}

/// In-memory Drive. Every call is counted so tests can assert on traffic.
#[derive(Default)]
pub struct FakeDrive {
    tree: Mutex<Tree>,
    pub export_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl FakeDrive {
    /// Adds a shared folder when `parent` is `None`, else a subfolder.
    pub fn add_folder(&self, parent: Option<&str>, folder: Folder) {
        let mut tree = self.tree.lock().unwrap();
        match parent {
            Some(parent) => tree
                .subfolders
                .entry(parent.to_string())
                .or_default()
                .push(folder),
            None => tree.shared.push(folder),
        }
    }

    /// Adds a document with its markdown export and a small PDF export.
    pub fn add_document(&self, folder_id: &str, doc: DocMetadata, markdown: &str) {
        let mut tree = self.tree.lock().unwrap();
        tree.content.insert(
            doc.id.clone(),
            DocContent {
                title: doc.name.clone(),
                image_uris: vec![],
            },
        );
        tree.exports.insert(
            (doc.id.clone(), ExportFormat::Markdown),
            markdown.as_bytes().to_vec(),
        );
        tree.exports
            .insert((doc.id.clone(), ExportFormat::Pdf), b"%PDF-1.4".to_vec());
        tree.documents
            .entry(folder_id.to_string())
            .or_default()
            .push(doc);
    }

    /// Replaces the listed metadata for `doc_id`, e.g. to bump its mtime.
    pub fn update_document(&self, doc: DocMetadata) {
        let mut tree = self.tree.lock().unwrap();
        for docs in tree.documents.values_mut() {
            for existing in docs.iter_mut().filter(|d| d.id == doc.id) {
                *existing = doc.clone();
            }
        }
    }

    pub fn set_content(&self, doc_id: &str, content: DocContent) {
        self.tree
            .lock()
            .unwrap()
            .content
            .insert(doc_id.to_string(), content);
    }

    pub fn remove_export(&self, doc_id: &str, format: ExportFormat) {
        self.tree
            .lock()
            .unwrap()
            .exports
            .remove(&(doc_id.to_string(), format));
    }

    pub fn add_url(&self, url: &str, body: &[u8]) {
        self.tree
            .lock()
            .unwrap()
            .urls
            .insert(url.to_string(), body.to_vec());
    }

    pub fn set_activity(&self, folder_id: &str, timestamp: &str) {
        self.tree
            .lock()
            .unwrap()
            .activity
            .insert(folder_id.to_string(), timestamp.to_string());
    }

    /// Listing this folder's contents fails with an API error.
    pub fn break_folder(&self, folder_id: &str) {
        self.tree
            .lock()
            .unwrap()
            .broken_folders
            .insert(folder_id.to_string());
    }

    pub fn exports(&self) -> usize {
        self.export_calls.load(Ordering::SeqCst)
    }

    fn check_folder(&self, folder_id: &str) -> Result<()> {
        if self.tree.lock().unwrap().broken_folders.contains(folder_id) {
            return Err(QuireError::Api {
                status: 500,
                message: format!("backend error listing {folder_id}"),
            });
        }
        Ok(())
    }
}

fn not_found(what: &str) -> QuireError {
    QuireError::Api {
        status: 404,
        message: format!("File not found: {what}"),
    }
}

#[async_trait]
impl Drive for FakeDrive {
    async fn list_shared_folders(&self) -> Result<Vec<Folder>> {
        Ok(self.tree.lock().unwrap().shared.clone())
    }

    async fn list_subfolders(&self, folder_id: &str) -> Result<Vec<Folder>> {
        self.check_folder(folder_id)?;
        let tree = self.tree.lock().unwrap();
        Ok(tree.subfolders.get(folder_id).cloned().unwrap_or_default())
    }

    async fn list_documents(&self, folder_id: &str) -> Result<Vec<DocMetadata>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_folder(folder_id)?;
        let tree = self.tree.lock().unwrap();
        Ok(tree.documents.get(folder_id).cloned().unwrap_or_default())
    }

    async fn latest_activity(&self, folder_id: &str) -> Result<Option<String>> {
        Ok(self.tree.lock().unwrap().activity.get(folder_id).cloned())
    }

    async fn document(&self, doc_id: &str) -> Result<DocContent> {
        let tree = self.tree.lock().unwrap();
        tree.content
            .get(doc_id)
            .cloned()
            .ok_or_else(|| not_found(doc_id))
    }

    async fn export(&self, doc_id: &str, format: ExportFormat) -> Result<Vec<u8>> {
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        let tree = self.tree.lock().unwrap();
        tree.exports
            .get(&(doc_id.to_string(), format))
            .cloned()
            .ok_or_else(|| not_found(doc_id))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let tree = self.tree.lock().unwrap();
        tree.urls.get(url).cloned().ok_or_else(|| not_found(url))
    }
}
