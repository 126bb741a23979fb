//! File-backed record storage.
//!
//! Every record lives in `<dir>/<slug>.json`. The directory is the only
//! source of truth: there is no index or cache, and concurrent writers to
//! the same slug simply race (last write wins).

use record_keeper_types::{is_dot_segment, Record};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const RECORD_EXT: &str = "json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record '{0}' not found")]
    NotFound(String),
    #[error("'{0}' cannot be used as a record file name")]
    InvalidSlug(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record file: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    /// Open (and create if needed) the records directory.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve the file backing `slug`. The slug must name exactly one file
    /// directly inside the records directory and survive as a URL segment.
    pub fn path_for(&self, slug: &str) -> StoreResult<PathBuf> {
        if slug.is_empty()
            || is_dot_segment(slug)
            || slug.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
        {
            return Err(StoreError::InvalidSlug(slug.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", slug, RECORD_EXT)))
    }

    /// Write `record` under its slug, replacing any record already stored
    /// there. Returns the slug.
    pub async fn save(&self, record: &Record) -> StoreResult<String> {
        let slug = record.slug();
        let path = self.path_for(&slug)?;
        let bytes = serde_json::to_vec(record)?;
        write_private(&path, &bytes).await?;
        log::info!("Saved record '{}' to {}", slug, path.display());
        Ok(slug)
    }

    pub async fn load(&self, slug: &str) -> StoreResult<Record> {
        let path = self.path_for(slug)?;
        let bytes = fs::read(&path)
            .await
            .map_err(|e| not_found_or_io(e, slug))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn delete(&self, slug: &str) -> StoreResult<()> {
        let path = self.path_for(slug)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(e, slug))?;
        log::info!("Deleted record '{}'", slug);
        Ok(())
    }

    /// Slugs of every stored record, sorted by file name.
    pub async fn slugs(&self) -> StoreResult<Vec<String>> {
        let mut read_dir = match fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!(
                    "Records directory {} is missing, recreating it",
                    self.dir.display()
                );
                fs::create_dir_all(&self.dir).await?;
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut slugs = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) => slugs.push(stem.to_string()),
                None => log::warn!("Skipping record file with non UTF-8 name: {}", path.display()),
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    /// Load every stored record. A single unreadable file fails the listing.
    pub async fn list(&self) -> StoreResult<Vec<Record>> {
        let slugs = self.slugs().await?;
        let mut records = Vec::with_capacity(slugs.len());
        for slug in &slugs {
            records.push(self.load(slug).await?);
        }
        Ok(records)
    }
}

fn not_found_or_io(err: std::io::Error, slug: &str) -> StoreError {
    if err.kind() == ErrorKind::NotFound {
        StoreError::NotFound(slug.to_string())
    } else {
        StoreError::Io(err)
    }
}

/// Record files are only readable by the service user.
async fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(bytes).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn temp_store() -> (TempDir, RecordStore) {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::open(tmp.path().join("records")).await.unwrap();
        (tmp, store)
    }

    #[tokio::test]
    async fn test_open_creates_directory() {
        let (tmp, store) = temp_store().await;
        assert!(tmp.path().join("records").is_dir());
        assert_eq!(store.dir(), tmp.path().join("records"));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (_tmp, store) = temp_store().await;
        let record = Record::new("Jack & Jill: The Untold Story (Part 2)", "Up the hill.");

        let slug = store.save(&record).await.unwrap();
        assert_eq!(slug, "jack--jill-the-untold-story-part-2");
        assert!(store.dir().join("jack--jill-the-untold-story-part-2.json").is_file());

        let loaded = store.load(&slug).await.unwrap();
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn test_saved_file_uses_original_field_names() {
        let (_tmp, store) = temp_store().await;
        store.save(&Record::new("Hello", "World")).await.unwrap();

        let raw = std::fs::read_to_string(store.dir().join("hello.json")).unwrap();
        assert_eq!(raw, r#"{"Title":"Hello","Content":"World"}"#);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, store) = temp_store().await;
        store.save(&Record::new("Secret", "shh")).await.unwrap();

        let mode = std::fs::metadata(store.dir().join("secret.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_colliding_titles_overwrite() {
        let (_tmp, store) = temp_store().await;
        store.save(&Record::new("Hello World", "first")).await.unwrap();
        store.save(&Record::new("hello world!", "second")).await.unwrap();

        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "second");
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let (_tmp, store) = temp_store().await;
        match store.load("nope").await {
            Err(StoreError::NotFound(slug)) => assert_eq!(slug, "nope"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_malformed_is_json_error() {
        let (_tmp, store) = temp_store().await;
        std::fs::write(store.dir().join("broken.json"), "{not json").unwrap();
        assert!(matches!(store.load("broken").await, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let (_tmp, store) = temp_store().await;
        let slug = store.save(&Record::new("Short Lived", "")).await.unwrap();

        store.delete(&slug).await.unwrap();
        assert!(matches!(store.load(&slug).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete(&slug).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_path_for_rejects_unsafe_slugs() {
        let (_tmp, store) = temp_store().await;
        for slug in ["", ".", "..", "...", "../etc/passwd", "a/b", "a\\b", "nul\0byte"] {
            assert!(
                matches!(store.path_for(slug), Err(StoreError::InvalidSlug(_))),
                "accepted {:?}",
                slug
            );
        }
        assert!(store.path_for("memyself.com").is_ok());
        assert!(store.path_for(".hidden").is_ok());
    }

    #[tokio::test]
    async fn test_save_rejects_dot_only_titles() {
        let (_tmp, store) = temp_store().await;
        for title in [".", ".."] {
            let result = store.save(&Record::new(title, "x")).await;
            assert!(
                matches!(result, Err(StoreError::InvalidSlug(_))),
                "saved {:?}",
                title
            );
        }
        assert!(store.slugs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_rejects_title_that_slugifies_to_path() {
        let (_tmp, store) = temp_store().await;
        let result = store.save(&Record::new("../Escape", "")).await;
        assert!(matches!(result, Err(StoreError::InvalidSlug(_))));

        let result = store.save(&Record::new("(?!)", "")).await;
        assert!(matches!(result, Err(StoreError::InvalidSlug(_))));
    }

    #[tokio::test]
    async fn test_list_sorted_and_skips_other_files() {
        let (_tmp, store) = temp_store().await;
        store.save(&Record::new("Zebra", "z")).await.unwrap();
        store.save(&Record::new("Apple", "a")).await.unwrap();
        store.save(&Record::new("Mango", "m")).await.unwrap();
        std::fs::write(store.dir().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(store.dir().join("nested.json")).unwrap();

        let titles: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Apple", "Mango", "Zebra"]);
        assert_eq!(store.slugs().await.unwrap(), vec!["apple", "mango", "zebra"]);
    }

    #[tokio::test]
    async fn test_list_fails_on_malformed_file() {
        let (_tmp, store) = temp_store().await;
        store.save(&Record::new("Fine", "ok")).await.unwrap();
        std::fs::write(store.dir().join("broken.json"), "]").unwrap();
        assert!(matches!(store.list().await, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_list_recreates_missing_directory() {
        let (_tmp, store) = temp_store().await;
        std::fs::remove_dir(store.dir()).unwrap();

        assert!(store.list().await.unwrap().is_empty());
        assert!(store.dir().is_dir());
    }
}
