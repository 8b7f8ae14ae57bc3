//! Reads [`Record`]s from JSON lines, a JSON array, or plain text.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::{PickItem, Record};

/// Error raised while reading records
#[derive(Error, Debug)]
pub enum RecordError {
    /// The input could not be read
    #[error("could not read records: {0}")]
    Io(#[from] std::io::Error),
    /// A JSON record is malformed
    #[error("invalid record on line {line}: {source}")]
    Parse {
        /// 1-based line of the record (1 for a JSON array)
        line: usize,
        /// Underlying JSON error
        source: serde_json::Error,
    },
}

/// Turns an input stream into records.
///
/// - input starting with `[` is parsed as a JSON array of records
/// - otherwise every non-empty line is a record: a JSON object when it starts with
///   `{`, plain text otherwise (its id is the line number)
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordReader {}

impl RecordReader {
    /// Reads all records from `source`
    pub fn of_bufread(&self, mut source: impl BufRead) -> Result<Vec<Record>, RecordError> {
        let mut content = String::new();
        source.read_to_string(&mut content)?;
        self.of_str(&content)
    }

    /// Reads all records from the file at `path`
    pub fn of_file(&self, path: impl AsRef<Path>) -> Result<Vec<Record>, RecordError> {
        self.of_bufread(BufReader::new(File::open(path)?))
    }

    /// Parses records out of `content`
    pub fn of_str(&self, content: &str) -> Result<Vec<Record>, RecordError> {
        if content.trim_start().starts_with('[') {
            return serde_json::from_str(content).map_err(|source| RecordError::Parse { line: 1, source });
        }

        let mut records = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record = if trimmed.starts_with('{') {
                serde_json::from_str(trimmed).map_err(|source| RecordError::Parse { line: line_no, source })?
            } else {
                Record::new(line_no as u64, line)
            };
            records.push(record);
        }
        debug!("read {} records", records.len());
        Ok(records)
    }

    /// Same as [`RecordReader::of_bufread`], as shared items
    pub fn items_of_bufread(&self, source: impl BufRead) -> Result<Vec<Arc<dyn PickItem>>, RecordError> {
        Ok(into_items(self.of_bufread(source)?))
    }

    /// Same as [`RecordReader::of_file`], as shared items
    pub fn items_of_file(&self, path: impl AsRef<Path>) -> Result<Vec<Arc<dyn PickItem>>, RecordError> {
        Ok(into_items(self.of_file(path)?))
    }
}

fn into_items(records: Vec<Record>) -> Vec<Arc<dyn PickItem>> {
    records
        .into_iter()
        .map(|record| Arc::new(record) as Arc<dyn PickItem>)
        .collect()
}
