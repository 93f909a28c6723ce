//! CSV dataset sink for labelled feature records.

use crate::core::features::FeatureError;
use crate::core::record::FeatureRecord;
use crate::core::schema::dataset_header;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Dataset write errors.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Feature(#[from] FeatureError),
}

/// Appends feature records to a CSV file.
///
/// The header row is written only when the file is new or empty, so
/// successive sessions can extend one dataset.
pub struct DatasetWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows_written: u64,
}

impl DatasetWriter {
    /// Open `path` for appending, creating it and its parent directory if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(dataset_header())?;
            writer.flush()?;
            tracing::debug!(path = %path.display(), "wrote dataset header");
        }

        Ok(Self {
            writer,
            path,
            rows_written: 0,
        })
    }

    /// Append one record.
    pub fn append(&mut self, record: &FeatureRecord) -> Result<(), DatasetError> {
        let row = record.to_row()?;
        self.writer.write_record(&row)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), DatasetError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Rows appended by this writer (not counting earlier sessions).
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DatasetWriter {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(path = %self.path.display(), "failed to flush dataset: {e}");
        }
    }
}
