//! CSV-backed snapshot source
//!
//! Reads one CSV file per snapshot. Files are opened only when the stream
//! is pulled, so a run that fails on the second snapshot never touches the
//! third.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use tracing::{debug, warn};

use crate::core::{Result, SankeyError, Snapshot, SnapshotRow, SnapshotSource, SnapshotStream};

/// One snapshot file and the label it is tagged with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvSnapshotFile {
    pub label: String,
    pub path: PathBuf,
}

impl CsvSnapshotFile {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// Snapshot source over a list of CSV files
#[derive(Debug, Clone)]
pub struct CsvSnapshotSource {
    entity_column: String,
    attribute_columns: Option<Vec<String>>,
    delimiter: u8,
    files: Vec<CsvSnapshotFile>,
}

impl CsvSnapshotSource {
    pub fn new(entity_column: impl Into<String>, files: Vec<CsvSnapshotFile>) -> Self {
        Self {
            entity_column: entity_column.into(),
            attribute_columns: None,
            delimiter: b',',
            files,
        }
    }

    /// Restrict the attribute columns; by default every non-entity column is one
    pub fn with_attribute_columns(mut self, columns: Vec<String>) -> Self {
        self.attribute_columns = Some(columns);
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl SnapshotSource for CsvSnapshotSource {
    fn snapshots(self: Box<Self>) -> SnapshotStream {
        let CsvSnapshotSource {
            entity_column,
            attribute_columns,
            delimiter,
            files,
        } = *self;

        Box::new(files.into_iter().map(move |file| {
            read_snapshot(
                &file.label,
                &file.path,
                &entity_column,
                attribute_columns.as_deref(),
                delimiter,
            )
        }))
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

fn read_snapshot(
    label: &str,
    path: &Path,
    entity_column: &str,
    attribute_columns: Option<&[String]>,
    delimiter: u8,
) -> Result<Snapshot> {
    debug!(label, path = %path.display(), "Reading snapshot file");

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| {
            SankeyError::source_error(label, format!("failed to open {}: {}", path.display(), e))
        })?;

    let headers = reader
        .headers()
        .map_err(|e| {
            SankeyError::source_error(
                label,
                format!("failed to read header of {}: {}", path.display(), e),
            )
        })?
        .clone();

    let position = |column: &str| headers.iter().position(|h| h == column);

    let entity_index = position(entity_column).ok_or_else(|| {
        SankeyError::source_error(
            label,
            format!("{} has no '{}' column", path.display(), entity_column),
        )
    })?;

    let attributes: Vec<(String, usize)> = match attribute_columns {
        Some(columns) => columns
            .iter()
            .map(|column| {
                let index = position(column).ok_or_else(|| {
                    SankeyError::source_error(
                        label,
                        format!("{} has no '{}' column", path.display(), column),
                    )
                })?;
                Ok((column.clone(), index))
            })
            .collect::<Result<_>>()?,
        None => headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != entity_index)
            .map(|(i, h)| (h.to_string(), i))
            .collect(),
    };

    let mut snapshot = Snapshot::new(
        label,
        entity_column,
        attributes.iter().map(|(name, _)| name.clone()).collect(),
    );

    for (line, record) in reader.records().enumerate() {
        // 1-indexed, plus the header row
        let line = line + 2;
        let record = record.map_err(|e| {
            SankeyError::source_error(
                label,
                format!("failed to parse line {} of {}: {}", line, path.display(), e),
            )
        })?;

        let entity = record.get(entity_index).unwrap_or("");
        if entity.is_empty() {
            warn!(label, line, "Skipping row without an entity id");
            continue;
        }

        let row = attributes
            .iter()
            .fold(SnapshotRow::new(entity), |row, (name, index)| {
                match record.get(*index) {
                    Some(value) => row.with_value(name.as_str(), value),
                    None => row.with_null(name.as_str()),
                }
            });
        snapshot.push_row(row);
    }

    debug!(label, rows = snapshot.row_count(), "Snapshot file read");
    Ok(snapshot)
}
