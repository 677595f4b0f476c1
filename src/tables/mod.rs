//! Flat table output
//!
//! Two headerless comma-separated tables are written from a merged run:
//!
//! - level table: `id,level`, one line per record
//! - object table: `id,object`, one line per object of each record
//!
//! Fields are written verbatim with no quoting, so ids, levels and object
//! names must not contain commas to read back correctly. Line order follows
//! the merged record order exactly.

use crate::error::{PipelineError, Result};
use crate::record::Record;
use csv::{QuoteStyle, Writer, WriterBuilder};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Line counts of one table write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSummary {
    pub level_rows: usize,
    pub object_rows: usize,
}

/// Writes the level and object tables for one run
///
/// On any failure the tables this write already opened are removed before the
/// error is returned, so a failed write never leaves a table pair that looks
/// complete. A file the write never reached is left untouched.
#[derive(Debug, Clone)]
pub struct TableWriter {
    level_path: PathBuf,
    object_path: PathBuf,
}

impl TableWriter {
    pub fn new(level_path: impl Into<PathBuf>, object_path: impl Into<PathBuf>) -> Self {
        Self {
            level_path: level_path.into(),
            object_path: object_path.into(),
        }
    }

    pub fn level_path(&self) -> &Path {
        &self.level_path
    }

    pub fn object_path(&self) -> &Path {
        &self.object_path
    }

    /// Write both tables, creating them even when `records` is empty
    pub fn write(&self, records: &[Record]) -> Result<TableSummary> {
        let mut created = Vec::with_capacity(2);
        match self.write_tables(records, &mut created) {
            Ok(summary) => {
                tracing::info!(
                    "Wrote {} level rows to {} and {} object rows to {}",
                    summary.level_rows,
                    self.level_path.display(),
                    summary.object_rows,
                    self.object_path.display()
                );
                Ok(summary)
            }
            Err(e) => {
                discard(&created);
                Err(e)
            }
        }
    }

    /// `created` collects every table opened (and so truncated) by this write
    fn write_tables<'a>(&'a self, records: &[Record], created: &mut Vec<&'a Path>) -> Result<TableSummary> {
        let mut levels = open_table(&self.level_path)?;
        created.push(&self.level_path);
        let mut objects = open_table(&self.object_path)?;
        created.push(&self.object_path);
        let mut summary = TableSummary::default();

        for record in records {
            warn_on_separator(record);

            levels
                .write_record([record.id.as_str(), record.level.as_str()])
                .map_err(|e| table_error(&self.level_path, e))?;
            summary.level_rows += 1;

            for object in &record.objects {
                objects
                    .write_record([record.id.as_str(), object.as_str()])
                    .map_err(|e| table_error(&self.object_path, e))?;
                summary.object_rows += 1;
            }
        }

        levels.flush().map_err(|source| PipelineError::Table {
            path: self.level_path.clone(),
            source,
        })?;
        objects.flush().map_err(|source| PipelineError::Table {
            path: self.object_path.clone(),
            source,
        })?;

        Ok(summary)
    }
}

/// Remove tables a failed write already truncated; others are left alone
fn discard(created: &[&Path]) {
    for path in created {
        if let Err(e) = fs::remove_file(path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!("Could not remove partial table {}: {}", path.display(), e);
        }
    }
}

fn open_table(path: &Path) -> Result<Writer<File>> {
    let file = File::create(path).map_err(|source| PipelineError::Table {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(file))
}

fn table_error(path: &Path, error: csv::Error) -> PipelineError {
    PipelineError::Table {
        path: path.to_path_buf(),
        source: error.into(),
    }
}

fn warn_on_separator(record: &Record) {
    let has_comma = record.id.contains(',')
        || record.level.contains(',')
        || record.objects.iter().any(|o| o.contains(','));
    if has_comma {
        tracing::warn!("Record '{}' contains a comma and will not read back cleanly", record.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn writer(dir: &TempDir) -> TableWriter {
        TableWriter::new(dir.path().join("levels.csv"), dir.path().join("objects.csv"))
    }

    #[test]
    fn test_writes_both_tables_in_record_order() {
        let dir = TempDir::new().unwrap();
        let tables = writer(&dir);
        let records = vec![
            Record::new("x1", "5", vec!["o1".into(), "o2".into()]),
            Record::new("x2", "9", vec![]),
        ];

        let summary = tables.write(&records).unwrap();

        assert_eq!(summary, TableSummary { level_rows: 2, object_rows: 2 });
        assert_eq!(fs::read_to_string(tables.level_path()).unwrap(), "x1,5\nx2,9\n");
        assert_eq!(fs::read_to_string(tables.object_path()).unwrap(), "x1,o1\nx1,o2\n");
    }

    #[test]
    fn test_empty_run_creates_empty_tables() {
        let dir = TempDir::new().unwrap();
        let tables = writer(&dir);

        let summary = tables.write(&[]).unwrap();

        assert_eq!(summary, TableSummary::default());
        assert_eq!(fs::read_to_string(tables.level_path()).unwrap(), "");
        assert_eq!(fs::read_to_string(tables.object_path()).unwrap(), "");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let dir = TempDir::new().unwrap();
        let tables = writer(&dir);
        let record = Record::new("x1", "1", vec!["o".into(), "o".into()]);

        tables.write(&[record.clone(), record]).unwrap();

        assert_eq!(fs::read_to_string(tables.level_path()).unwrap(), "x1,1\nx1,1\n");
        assert_eq!(fs::read_to_string(tables.object_path()).unwrap().lines().count(), 4);
    }

    #[test]
    fn test_failure_removes_partial_tables() {
        let dir = TempDir::new().unwrap();
        let level_path = dir.path().join("levels.csv");
        let tables = TableWriter::new(&level_path, dir.path().join("missing").join("objects.csv"));

        let err = tables.write(&[Record::new("x1", "1", vec![])]).unwrap_err();

        assert!(matches!(err, PipelineError::Table { .. }));
        assert!(!level_path.exists());
    }

    #[test]
    fn test_failure_keeps_tables_it_never_opened() {
        let dir = TempDir::new().unwrap();
        let object_path = dir.path().join("objects.csv");
        fs::write(&object_path, "user data").unwrap();
        let tables = TableWriter::new(dir.path().join("missing").join("levels.csv"), &object_path);

        let err = tables.write(&[Record::new("x1", "1", vec![])]).unwrap_err();

        assert!(matches!(err, PipelineError::Table { .. }));
        assert_eq!(fs::read_to_string(&object_path).unwrap(), "user data");
    }
}
