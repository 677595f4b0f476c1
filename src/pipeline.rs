//! End-to-end run: execute a strategy over an archive set, then write tables

use crate::archive::{ArchiveName, ArchiveReader};
use crate::error::Result;
use crate::parallel::{ExecutionStrategy, MergedResult, Progress, StrategyKind};
use crate::record::RecordParser;
use crate::tables::{TableSummary, TableWriter};
use std::time::{Duration, Instant};

/// Outcome of a successful run that wrote its tables
#[derive(Debug, Clone)]
pub struct RunReport {
    pub strategy: StrategyKind,
    pub archives: usize,
    pub chunks: usize,
    pub records: usize,
    pub tables: TableSummary,
    pub elapsed: Duration,
}

/// A configured strategy plus the reader its workers share
pub struct Pipeline<P> {
    strategy: ExecutionStrategy,
    reader: ArchiveReader<P>,
    show_progress: bool,
}

impl<P: RecordParser> Pipeline<P> {
    pub fn new(strategy: ExecutionStrategy, parser: P) -> Self {
        Self {
            strategy,
            reader: ArchiveReader::new(parser),
            show_progress: false,
        }
    }

    /// Draw a progress bar on stderr while running
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn strategy(&self) -> &ExecutionStrategy {
        &self.strategy
    }

    /// Read every archive and merge the records, or fail as a whole
    pub fn run(&self, archives: &[ArchiveName]) -> Result<MergedResult> {
        let progress = if self.show_progress {
            Progress::bar(archives.len(), &self.strategy.kind().to_string())
        } else {
            Progress::hidden(archives.len())
        };

        let merged = self.strategy.execute(archives, &self.reader, &progress);
        progress.finish();
        merged
    }

    /// Run and, only if every worker succeeded, write both tables
    pub fn run_to_tables(&self, archives: &[ArchiveName], writer: &TableWriter) -> Result<RunReport> {
        let start = Instant::now();
        let merged = self.run(archives)?;
        let tables = writer.write(merged.records())?;

        Ok(RunReport {
            strategy: self.strategy.kind(),
            archives: archives.len(),
            chunks: merged.arrivals().len(),
            records: merged.len(),
            tables,
            elapsed: start.elapsed(),
        })
    }
}
