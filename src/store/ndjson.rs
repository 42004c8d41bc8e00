use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::errors::AppError;

/// Read a line-delimited JSON file into memory. Blank lines are skipped.
pub fn load_ndjson<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    let file = File::open(path).map_err(|e| AppError::io(path, e))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| AppError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| AppError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }

    tracing::debug!(path = %path.display(), records = records.len(), "Loaded NDJSON file");
    Ok(records)
}

/// Write records as line-delimited JSON, creating parent directories.
/// Returns the number of rows written.
pub fn write_ndjson<T: Serialize>(path: &Path, records: &[T]) -> Result<usize, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
    }

    let file = File::create(path).map_err(|e| AppError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)
            .map_err(|e| AppError::Internal(e.into()))?;
        writer.write_all(b"\n").map_err(|e| AppError::io(path, e))?;
    }
    writer.flush().map_err(|e| AppError::io(path, e))?;

    Ok(records.len())
}
