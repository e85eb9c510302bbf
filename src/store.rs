use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::StoreError;
use crate::period::Period;
use crate::record::RecordBatch;

pub type StoreResult<T> = core::result::Result<T, StoreError>;

/// Persisted snapshots, one batch per period.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn exists(&self, period: &Period) -> StoreResult<bool>;

    async fn read(&self, period: &Period) -> StoreResult<RecordBatch>;

    /// Replaces the whole snapshot of `period`.
    async fn write(&self, period: &Period, batch: &RecordBatch) -> StoreResult<()>;

    /// Period keys with a stored snapshot, ascending.
    async fn list(&self) -> StoreResult<Vec<Period>>;
}

/// Stores every period as `{root}/{period}.json`.
///
/// Writes replace the file in place; a crash mid-write can leave a truncated
/// snapshot behind, which then surfaces as a read error.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, period: &Period) -> PathBuf {
        self.root.join(format!("{period}.json"))
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    async fn exists(&self, period: &Period) -> StoreResult<bool> {
        Ok(fs::try_exists(self.path_for(period)).await?)
    }

    async fn read(&self, period: &Period) -> StoreResult<RecordBatch> {
        let bytes = match fs::read(self.path_for(period)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(period.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write(&self, period: &Period, batch: &RecordBatch) -> StoreResult<()> {
        // Lazily create the storage folder, a no-op when it already exists.
        fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_vec(batch)?;
        fs::write(self.path_for(period), json).await?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Period>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut periods = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                periods.push(Period::from(stem));
            }
        }
        periods.sort_unstable();
        Ok(periods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ItemRecord;
    use tempfile::TempDir;

    fn batch() -> RecordBatch {
        vec![ItemRecord {
            rank: 1,
            title: "Rust 2.0".into(),
            link: "https://example.com".into(),
            score: "3 points".into(),
            comment_count: Some("1 comment".into()),
            id: Some(9),
        }]
    }

    #[tokio::test]
    async fn write_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("storage"));
        let period = Period::from("2024-03-07");

        assert!(!store.exists(&period).await.unwrap());
        store.write(&period, &batch()).await.unwrap();
        assert!(store.exists(&period).await.unwrap());
        assert_eq!(store.read(&period).await.unwrap(), batch());

        // Second write replaces the file.
        store.write(&period, &Vec::new()).await.unwrap();
        assert!(store.read(&period).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_missing_period_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let err = store.read(&Period::from("1999")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(key) if key == "1999"));
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_a_json_error() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let period = Period::from("2024");
        std::fs::write(store.path_for(&period), b"[{\"rank\":").unwrap();

        let err = store.read(&period).await.unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }

    #[tokio::test]
    async fn list_returns_sorted_json_stems() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(FileStore::new(dir.path().join("absent")).list().await.unwrap().is_empty());

        for key in ["2024-03-08", "2024-03-06", "2024-03-07"] {
            store.write(&Period::from(key), &batch()).await.unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let keys: Vec<String> = store
            .list()
            .await
            .unwrap()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(keys, vec!["2024-03-06", "2024-03-07", "2024-03-08"]);
    }
}
