//! JSON Lines persistence for project datasets.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::record::ProjectRecord;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write dataset {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid record on line {line}: {source}")]
    InvalidRecord {
        line: usize,
        source: serde_json::Error,
    },
    #[error("Failed to encode record: {0}")]
    Encode(serde_json::Error),
    #[error("dataset {0} contains no records")]
    Empty(PathBuf),
}

/// Write records as one JSON object per line, creating parent directories.
pub fn write_jsonl(path: &Path, records: &[ProjectRecord]) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| DatasetError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| DatasetError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record).map_err(DatasetError::Encode)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read every record from a JSON Lines file. Blank lines are skipped.
pub fn read_jsonl(path: &Path) -> Result<Vec<ProjectRecord>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str::<ProjectRecord>(&line)
            .map_err(|source| DatasetError::InvalidRecord {
                line: idx + 1,
                source,
            })?;
        records.push(record);
    }
    if records.is_empty() {
        return Err(DatasetError::Empty(path.to_path_buf()));
    }
    Ok(records)
}
