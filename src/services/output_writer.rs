//! Output writer - capability layer
//!
//! Maps a record and section to files under the output root and appends
//! metadata rows to the shared CSV. Knows nothing about the workflow.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::OutputError;
use crate::models::{CaptureKind, ExtractedMetadata, RecordId, Section};

/// Artifact and CSV writer
///
/// Layout: `{out_dir}/{region}/{NNNNNNNN}-{D}/{section}.{ext}`. Record
/// directories are disjoint, so only the CSV needs a lock.
pub struct OutputWriter {
    out_dir: PathBuf,
    csv_path: PathBuf,
    csv_lock: Mutex<()>,
}

impl OutputWriter {
    pub fn new(config: &Config) -> Self {
        Self::with_paths(&config.out_dir, &config.csv_file)
    }

    pub fn with_paths(out_dir: impl Into<PathBuf>, csv_path: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            csv_path: csv_path.into(),
            csv_lock: Mutex::new(()),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    /// Directory holding one record's artifacts
    pub fn record_dir(&self, record: &RecordId) -> PathBuf {
        self.out_dir.join(record.region()).join(record.dir_name())
    }

    /// Full path of one artifact
    pub fn artifact_path(&self, record: &RecordId, section: Section, kind: CaptureKind) -> PathBuf {
        self.record_dir(record)
            .join(format!("{}.{}", section.file_stem(), kind.extension()))
    }

    /// Creates `path` and its parents if absent
    ///
    /// An existing non-directory at `path` is an error.
    ///
    /// # Returns
    /// `true` when the directory was created by this call
    pub async fn ensure_directory(&self, path: &Path) -> Result<bool, OutputError> {
        let create_err = |source: io::Error| OutputError::CreateDir {
            path: path.to_path_buf(),
            source,
        };
        match fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => return Ok(false),
            Ok(_) => {
                return Err(create_err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "path exists and is not a directory",
                )))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(create_err(e)),
        }
        fs::create_dir_all(path).await.map_err(create_err)?;
        info!("📁 Created directory {}", path.display());
        Ok(true)
    }

    /// Writes one artifact, overwriting a previous run's file
    pub async fn write_artifact(
        &self,
        record: &RecordId,
        section: Section,
        kind: CaptureKind,
        data: &[u8],
    ) -> Result<PathBuf, OutputError> {
        self.ensure_directory(&self.record_dir(record)).await?;

        let path = self.artifact_path(record, section, kind);
        fs::write(&path, data)
            .await
            .map_err(|source| OutputError::Write {
                path: path.clone(),
                source,
            })?;
        debug!("Wrote {} ({} bytes)", path.display(), data.len());
        Ok(path)
    }

    /// Appends one metadata row to the shared CSV
    pub async fn append_csv_row(&self, metadata: &ExtractedMetadata) -> Result<(), OutputError> {
        let line = format!("{}\n", metadata.csv_row());
        let write_err = |source| OutputError::Write {
            path: self.csv_path.clone(),
            source,
        };

        let _guard = self.csv_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.csv_path)
            .await
            .map_err(write_err)?;
        file.write_all(line.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        debug!("Appended CSV row for {}", metadata.book_number);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn writer(dir: &TempDir) -> OutputWriter {
        OutputWriter::with_paths(dir.path().join("output"), dir.path().join("output.csv"))
    }

    #[test]
    fn test_artifact_path_layout() {
        let writer = OutputWriter::with_paths("output", "output.csv");
        let record = RecordId::new("OS1O", 19).unwrap();
        assert_eq!(
            writer.artifact_path(&record, Section::ISp, CaptureKind::Pdf),
            PathBuf::from("output/OS1O/00000019-7/dzial_I-Sp.pdf")
        );
        assert_eq!(
            writer.artifact_path(&record, Section::IV, CaptureKind::Text),
            PathBuf::from("output/OS1O/00000019-7/dzial_IV.txt")
        );
    }

    #[tokio::test]
    async fn test_ensure_directory_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir);
        let path = dir.path().join("a").join("b");

        assert!(writer.ensure_directory(&path).await.unwrap());
        assert!(!writer.ensure_directory(&path).await.unwrap());
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_directory_rejects_a_file() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir);
        let path = dir.path().join("output");
        std::fs::write(&path, b"").unwrap();

        let err = writer.ensure_directory(&path).await.unwrap_err();
        assert!(matches!(err, OutputError::CreateDir { .. }));
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn test_write_artifact_overwrites() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir);
        let record = RecordId::new("KR1P", 286974).unwrap();

        writer
            .write_artifact(&record, Section::II, CaptureKind::Text, b"first")
            .await
            .unwrap();
        let path = writer
            .write_artifact(&record, Section::II, CaptureKind::Text, b"second")
            .await
            .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert!(path.ends_with("KR1P/00286974-1/dzial_II.txt"));
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        // A file where the output root should be
        let blocker = dir.path().join("output");
        std::fs::write(&blocker, b"").unwrap();
        let writer = writer(&dir);
        let record = RecordId::new("KR1P", 286974).unwrap();

        let err = writer
            .write_artifact(&record, Section::IO, CaptureKind::Pdf, b"%PDF")
            .await
            .unwrap_err();
        assert!(matches!(err, OutputError::CreateDir { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_csv_appends_keep_lines_whole() {
        let dir = TempDir::new().unwrap();
        let writer = Arc::new(writer(&dir));

        let mut handles = Vec::new();
        for i in 0..32 {
            let writer = writer.clone();
            handles.push(tokio::spawn(async move {
                let meta = ExtractedMetadata {
                    book_number: format!("KR1P/{:08}/0", i),
                    book_type: "LOKAL".to_string(),
                    location: vec!["MAŁOPOLSKIE".to_string(), "KRAKÓW".to_string()],
                    owner: "X".repeat(512),
                };
                writer.append_csv_row(&meta).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let content = std::fs::read_to_string(writer.csv_path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 32);
        for line in lines {
            assert_eq!(line.split(';').count(), 9);
            assert!(line.ends_with(&"X".repeat(512)));
        }
    }
}
