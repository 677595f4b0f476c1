//! Error taxonomy for the ingest pipeline
//!
//! Every failure aborts the whole run. Errors raised inside a concurrent worker
//! are wrapped in [`PipelineError::Worker`] so the collector can report which
//! chunk failed while keeping the original kind reachable through [`PipelineError::root`].

use crate::archive::ArchiveName;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure to turn one entry's bytes into a [`Record`](crate::record::Record)
#[derive(Error, Debug)]
pub enum RecordParseError {
    #[error("entry is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}

/// The unified error type for a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot open archive {archive}: {source}")]
    ArchiveOpen {
        archive: ArchiveName,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("cannot parse entry '{entry}' in archive {archive}: {source}")]
    RecordParse {
        archive: ArchiveName,
        entry: String,
        #[source]
        source: RecordParseError,
    },

    #[error("worker {worker} failed: {source}")]
    Worker {
        worker: usize,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("worker {worker} terminated without reporting a result")]
    WorkerLost { worker: usize },

    #[error("worker threads panicked during {0} execution")]
    Panicked(&'static str),

    #[error("cannot start worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("cannot build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid partition: {0}")]
    Partition(String),

    #[error("cannot list archives in {}: {source}", path.display())]
    Discover {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot write table {}: {source}", path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Wrap an error surfaced from the worker handling chunk `worker`
    pub fn in_worker(worker: usize, source: PipelineError) -> Self {
        PipelineError::Worker {
            worker,
            source: Box::new(source),
        }
    }

    /// Strip `Worker` layers and return the original failure
    pub fn root(&self) -> &PipelineError {
        match self {
            PipelineError::Worker { source, .. } => source.root(),
            other => other,
        }
    }

    /// The archive that caused the failure, when one is known
    pub fn archive(&self) -> Option<&ArchiveName> {
        match self.root() {
            PipelineError::ArchiveOpen { archive, .. }
            | PipelineError::RecordParse { archive, .. } => Some(archive),
            _ => None,
        }
    }

    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self.root() {
            PipelineError::ArchiveOpen { .. } => "archive-open",
            PipelineError::RecordParse { .. } => "record-parse",
            PipelineError::Worker { .. } => "worker",
            PipelineError::WorkerLost { .. } => "worker-lost",
            PipelineError::Panicked(_) => "panicked",
            PipelineError::Spawn(_) | PipelineError::Pool(_) => "spawn",
            PipelineError::Partition(_) => "partition",
            PipelineError::Discover { .. } => "discover",
            PipelineError::Table { .. } => "table",
        }
    }
}
