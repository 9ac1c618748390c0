//! File-based storage for conversation records.
//!
//! Filenames are generated as `<prefix><YYYYMMDD_HHMMSS><extension>`; the
//! list and info operations key off that naming convention and ignore
//! anything else in the directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;

use crate::debate::transcript::ConversationRecord;
use crate::error::StorageError;

/// Where and how records are written.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory the records live in; created on first save.
    pub directory: PathBuf,
    /// Filename prefix.
    pub file_prefix: String,
    /// Filename extension, dot included.
    pub extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("conversations"),
            file_prefix: "conv_ai_".to_string(),
            extension: ".json".to_string(),
        }
    }
}

/// Metadata about one stored record file.
#[derive(Debug, Clone)]
pub struct RecordFileInfo {
    /// The record's filename.
    pub filename: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Creation time, where the platform reports one.
    pub created: Option<DateTime<Utc>>,
    /// Last modification time, where the platform reports one.
    pub modified: Option<DateTime<Utc>>,
}

/// Save/load/list access to conversation records.
pub struct RecordStore {
    config: StorageConfig,
}

impl RecordStore {
    /// Creates a store with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Creates a store with the default directory and naming.
    pub fn with_defaults() -> Self {
        Self::new(StorageConfig::default())
    }

    /// The directory records are written to.
    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    fn filename_for(&self, timestamp: DateTime<Utc>) -> String {
        format!(
            "{}{}{}",
            self.config.file_prefix,
            timestamp.format("%Y%m%d_%H%M%S"),
            self.config.extension
        )
    }

    fn matches_naming(&self, filename: &str) -> bool {
        filename.starts_with(&self.config.file_prefix) && filename.ends_with(&self.config.extension)
    }

    /// Saves a record under a freshly generated filename.
    ///
    /// Returns the filename (not the full path).
    pub async fn save(&self, record: &ConversationRecord) -> Result<String, StorageError> {
        fs::create_dir_all(&self.config.directory).await?;

        let filename = self.filename_for(Utc::now());
        let path = self.config.directory.join(&filename);
        let json = serde_json::to_vec_pretty(record)?;
        fs::write(&path, json).await?;

        tracing::info!(path = %path.display(), "Saved conversation record");
        Ok(filename)
    }

    /// Loads a record by filename.
    pub async fn load(&self, filename: &str) -> Result<ConversationRecord, StorageError> {
        let path = self.config.directory.join(filename);
        let bytes = fs::read(&path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(filename.to_string())
            } else {
                StorageError::Io(err)
            }
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Lists stored record filenames, newest first.
    ///
    /// The timestamp inside the name sorts lexicographically, so plain
    /// descending name order is chronological.
    pub async fn list(&self) -> Result<Vec<String>, StorageError> {
        if !self.config.directory.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.config.directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if self.matches_naming(&name) {
                names.push(name);
            }
        }

        names.sort_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// Returns size and timestamps for one stored record.
    pub async fn file_info(&self, filename: &str) -> Result<RecordFileInfo, StorageError> {
        let path = self.config.directory.join(filename);
        let metadata = fs::metadata(&path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(filename.to_string())
            } else {
                StorageError::Io(err)
            }
        })?;

        Ok(RecordFileInfo {
            filename: filename.to_string(),
            size_bytes: metadata.len(),
            created: metadata.created().ok().map(DateTime::<Utc>::from),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::transcript::Transcript;
    use crate::personas::Persona;

    fn sample_record() -> ConversationRecord {
        let mut transcript = Transcript::new();
        transcript.record("Nova", "Silence can be eloquent.");
        transcript.record("Atlas", "Eloquence needs words.");
        let (nova, atlas) = (
            Persona::new("Nova", "optimist", "warm"),
            Persona::new("Atlas", "skeptic", "dry"),
        );
        ConversationRecord::build("silence", &nova, &atlas, transcript)
    }

    fn store_in(dir: &Path) -> RecordStore {
        RecordStore::new(StorageConfig {
            directory: dir.to_path_buf(),
            ..StorageConfig::default()
        })
    }

    #[tokio::test]
    async fn save_generates_timestamped_filename() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());

        let filename = store.save(&sample_record()).await.expect("save");
        assert!(filename.starts_with("conv_ai_"));
        assert!(filename.ends_with(".json"));

        // prefix + YYYYMMDD_HHMMSS + extension
        let stamp = &filename["conv_ai_".len()..filename.len() - ".json".len()];
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "_");

        assert!(dir.path().join(&filename).exists());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());

        let record = sample_record();
        let filename = store.save(&record).await.expect("save");
        let loaded = store.load(&filename).await.expect("load");

        assert_eq!(loaded.metadata.topic, "silence");
        assert_eq!(loaded.metadata.total_turns, 2);
        assert_eq!(loaded.conversation[1].speaker, "Atlas");
    }

    #[tokio::test]
    async fn list_is_newest_first_and_ignores_foreign_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());

        for name in [
            "conv_ai_20240101_120000.json",
            "conv_ai_20250601_090000.json",
            "notes.txt",
            "other_20240101_120000.json",
        ] {
            std::fs::write(dir.path().join(name), b"{}").expect("write");
        }

        let names = store.list().await.expect("list");
        assert_eq!(
            names,
            vec![
                "conv_ai_20250601_090000.json".to_string(),
                "conv_ai_20240101_120000.json".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn list_on_missing_directory_is_empty() {
        let store = store_in(Path::new("/definitely/not/a/real/dir"));
        assert!(store.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());
        let err = store.load("conv_ai_19990101_000000.json").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn file_info_reports_size() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());

        let filename = store.save(&sample_record()).await.expect("save");
        let info = store.file_info(&filename).await.expect("info");
        assert_eq!(info.filename, filename);
        assert!(info.size_bytes > 0);
        assert!(info.modified.is_some());
    }
}
