use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::app::Result;
use crate::domain::Sitemap;
use crate::store::{ProcessedFolders, SitemapStore};

const SITEMAP_FILE: &str = "sitemap.json";
const PROCESSED_FOLDERS_FILE: &str = "processedFolders.json";

/// Pretty-printed JSON files under the data directory:
/// `{data_dir}/{host}/sitemap.json` and `{data_dir}/processedFolders.json`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn sitemap_path(&self, host: &str) -> PathBuf {
        self.data_dir.join(host).join(SITEMAP_FILE)
    }

    fn processed_folders_path(&self) -> PathBuf {
        self.data_dir.join(PROCESSED_FOLDERS_FILE)
    }
}

/// Missing file ⇒ `T::default()`.
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

/// Writes through a sibling temp file so readers never see a partial file.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl SitemapStore for JsonStore {
    fn load_sitemap(&self, host: &str) -> Result<Sitemap> {
        read_json(&self.sitemap_path(host))
    }

    fn save_sitemap(&self, host: &str, sitemap: &Sitemap) -> Result<()> {
        let path = self.sitemap_path(host);
        let mut merged: Sitemap = read_json(&path)?;
        merged.extend(sitemap.iter().map(|(k, v)| (k.clone(), v.clone())));

        debug!(host, entries = merged.len(), path = %path.display(), "Saving sitemap");
        write_json(&path, &merged)
    }

    fn load_processed_folders(&self) -> Result<ProcessedFolders> {
        read_json(&self.processed_folders_path())
    }

    fn save_processed_folders(&self, folders: &ProcessedFolders) -> Result<()> {
        write_json(&self.processed_folders_path(), folders)
    }

    fn hosts(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut hosts = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.path().join(SITEMAP_FILE).is_file() {
                hosts.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        hosts.sort();
        Ok(hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SitemapEntry;
    use crate::test_helpers::published_doc;

    fn entry(path: &str, id: &str) -> SitemapEntry {
        SitemapEntry::from_download(
            path.to_string(),
            &published_doc(id, "Title", 10),
            "Title".to_string(),
            None,
            vec![],
        )
    }

    #[test]
    fn test_missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        assert!(store.load_sitemap("example.com").unwrap().is_empty());
        assert!(store.load_processed_folders().unwrap().is_empty());
        assert!(store.hosts().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_sitemap() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let mut sitemap = Sitemap::new();
        sitemap.insert("/index".into(), entry("/index", "a"));

        store.save_sitemap("example.com", &sitemap).unwrap();
        assert_eq!(store.load_sitemap("example.com").unwrap(), sitemap);
        assert_eq!(store.hosts().unwrap(), vec!["example.com"]);

        let raw = fs::read_to_string(store.sitemap_path("example.com")).unwrap();
        assert!(raw.contains("\"googleDocId\": \"a\""));
        assert!(!raw.contains("customDate"));
    }

    #[test]
    fn test_save_merges_with_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        let mut first = Sitemap::new();
        first.insert("/old".into(), entry("/old", "a"));
        first.insert("/index".into(), entry("/index", "b"));
        store.save_sitemap("example.com", &first).unwrap();

        let mut second = Sitemap::new();
        let mut updated = entry("/index", "b");
        updated.title = "New title".into();
        second.insert("/index".into(), updated);
        store.save_sitemap("example.com", &second).unwrap();

        let loaded = store.load_sitemap("example.com").unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains_key("/old"));
        assert_eq!(loaded["/index"].title, "New title");
    }

    #[test]
    fn test_processed_folders_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let mut folders = ProcessedFolders::new();
        folders.insert("folder1".into(), "2024-05-01T10:00:00.000Z".into());

        store.save_processed_folders(&folders).unwrap();
        assert_eq!(store.load_processed_folders().unwrap(), folders);
        assert!(dir.path().join("processedFolders.json").exists());
    }

    #[test]
    fn test_corrupt_sitemap_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        fs::create_dir_all(dir.path().join("example.com")).unwrap();
        fs::write(store.sitemap_path("example.com"), "{not json").unwrap();
        assert!(store.load_sitemap("example.com").is_err());
    }
}
