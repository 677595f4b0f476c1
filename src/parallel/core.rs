use super::partition::Chunking;
use super::progress::Progress;
use super::{pipes::PipeExecutor, pool::PoolExecutor, queue::QueueExecutor, sequential::SequentialExecutor};
use crate::archive::{ArchiveName, ArchiveReader};
use crate::error::{PipelineError, Result};
use crate::record::{Record, RecordParser};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Records produced by one worker for one chunk, in archive then entry order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialResult {
    pub chunk: usize,
    pub records: Vec<Record>,
}

/// Concatenation of every worker's records for one run
///
/// `arrivals` lists chunk indices in the order their partial results were
/// appended. Sequential and pipe runs always append in chunk order; pool and
/// queue runs append in completion order, which may differ between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedResult {
    records: Vec<Record>,
    arrivals: Vec<usize>,
}

impl MergedResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, partial: PartialResult) {
        self.arrivals.push(partial.chunk);
        self.records.extend(partial.records);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn arrivals(&self) -> &[usize] {
        &self.arrivals
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in a canonical order, for comparing runs as multisets
    pub fn canonical(&self) -> Vec<Record> {
        let mut records = self.records.clone();
        records.sort();
        records
    }
}

/// A concurrency policy that turns an archive list into a [`MergedResult`]
///
/// Every implementation must produce the same record multiset and must turn
/// any worker failure into a run failure, discarding partial results.
pub trait Executor {
    fn execute<P: RecordParser>(
        &self,
        archives: &[ArchiveName],
        reader: &ArchiveReader<P>,
        progress: &Progress,
    ) -> Result<MergedResult>;
}

/// Strategy names as they appear in configuration and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Caller thread reads every archive in order
    Sequential,
    /// Fixed-size thread pool, results drained in completion order
    Pool,
    /// One thread and one private channel per chunk, read in creation order
    Pipes,
    /// One thread per chunk, all writing to one shared channel
    Queue,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Sequential,
        StrategyKind::Pool,
        StrategyKind::Pipes,
        StrategyKind::Queue,
    ];

    /// Short suffix used for per-strategy output tables
    pub fn suffix(&self) -> &'static str {
        match self {
            StrategyKind::Sequential => "seq",
            StrategyKind::Pool => "pool",
            StrategyKind::Pipes => "pipes",
            StrategyKind::Queue => "queue",
        }
    }

    /// Whether runs of this strategy always merge chunks in chunk order
    pub fn is_order_deterministic(&self) -> bool {
        matches!(self, StrategyKind::Sequential | StrategyKind::Pipes)
    }

    fn default_chunking(&self) -> Chunking {
        match self {
            StrategyKind::Sequential => Chunking::Whole,
            StrategyKind::Pipes => Chunking::Coarse,
            StrategyKind::Pool | StrategyKind::Queue => Chunking::PerWorker,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Sequential => "sequential",
            StrategyKind::Pool => "pool",
            StrategyKind::Pipes => "pipes",
            StrategyKind::Queue => "queue",
        };
        f.pad(name)
    }
}

/// Execution strategy selected by configuration
#[derive(Debug, Clone)]
pub enum ExecutionStrategy {
    Sequential(SequentialExecutor),
    Pool(PoolExecutor),
    Pipes(PipeExecutor),
    Queue(QueueExecutor),
}

impl ExecutionStrategy {
    /// Build the strategy for `kind`
    ///
    /// `chunk_size` overrides the strategy's default chunking when set; the
    /// sequential strategy always runs one chunk.
    pub fn new(kind: StrategyKind, workers: usize, chunk_size: Option<usize>) -> Self {
        let chunking = match chunk_size {
            Some(size) if kind != StrategyKind::Sequential => Chunking::Fixed(size),
            _ => kind.default_chunking(),
        };

        match kind {
            StrategyKind::Sequential => ExecutionStrategy::Sequential(SequentialExecutor),
            StrategyKind::Pool => ExecutionStrategy::Pool(PoolExecutor::new(workers, chunking)),
            StrategyKind::Pipes => ExecutionStrategy::Pipes(PipeExecutor::new(workers, chunking)),
            StrategyKind::Queue => ExecutionStrategy::Queue(QueueExecutor::new(workers, chunking)),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            ExecutionStrategy::Sequential(_) => StrategyKind::Sequential,
            ExecutionStrategy::Pool(_) => StrategyKind::Pool,
            ExecutionStrategy::Pipes(_) => StrategyKind::Pipes,
            ExecutionStrategy::Queue(_) => StrategyKind::Queue,
        }
    }

    pub fn execute<P: RecordParser>(
        &self,
        archives: &[ArchiveName],
        reader: &ArchiveReader<P>,
        progress: &Progress,
    ) -> Result<MergedResult> {
        let start = std::time::Instant::now();

        let merged = match self {
            ExecutionStrategy::Sequential(executor) => executor.execute(archives, reader, progress),
            ExecutionStrategy::Pool(executor) => executor.execute(archives, reader, progress),
            ExecutionStrategy::Pipes(executor) => executor.execute(archives, reader, progress),
            ExecutionStrategy::Queue(executor) => executor.execute(archives, reader, progress),
        };

        match &merged {
            Ok(merged) => tracing::info!(
                "{} run merged {} records from {} archives in {} chunks ({:.3}s)",
                self.kind(),
                merged.len(),
                archives.len(),
                merged.arrivals().len(),
                start.elapsed().as_secs_f64()
            ),
            Err(e) => tracing::error!("{} run failed: {}", self.kind(), e),
        }

        merged
    }

    /// Calculate the worker count from available cores and configuration limits
    ///
    /// ```text
    /// workers = max(1, cores * thread_percentage / 100)
    /// workers = min(workers, max_threads)   if max_threads > 0
    /// ```
    pub fn calculate_optimal_workers(max_threads: usize, thread_percentage: u8) -> usize {
        let available_cores = num_cpus::get();
        let by_percentage = std::cmp::max(1, (available_cores * thread_percentage as usize) / 100);

        if max_threads > 0 {
            std::cmp::min(max_threads, by_percentage)
        } else {
            by_percentage
        }
    }
}

/// Body shared by every worker: read the chunk's archives back to back
///
/// Always returns; a panic inside the reader becomes [`PipelineError::WorkerLost`]
/// so collectors never wait on a worker that vanished.
pub(crate) fn run_chunk<P: RecordParser>(
    index: usize,
    archives: &[ArchiveName],
    reader: &ArchiveReader<P>,
    progress: &Progress,
) -> Result<PartialResult> {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let mut records = Vec::new();
        for archive in archives {
            records.extend(reader.read(archive)?);
            progress.archive_done();
        }
        Ok::<_, PipelineError>(records)
    }));

    match outcome {
        Ok(Ok(records)) => {
            tracing::debug!("Worker {} finished {} archives", index, archives.len());
            Ok(PartialResult { chunk: index, records })
        }
        Ok(Err(e)) => Err(PipelineError::in_worker(index, e)),
        Err(_) => {
            tracing::error!("Worker {} panicked", index);
            Err(PipelineError::WorkerLost { worker: index })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_result_tracks_arrivals() {
        let mut merged = MergedResult::new();
        merged.append(PartialResult {
            chunk: 1,
            records: vec![Record::new("b", "2", vec![])],
        });
        merged.append(PartialResult {
            chunk: 0,
            records: vec![Record::new("a", "1", vec![]), Record::new("c", "3", vec![])],
        });

        assert_eq!(merged.arrivals(), &[1, 0]);
        assert_eq!(merged.len(), 3);
        let canonical = merged.canonical();
        let ids: Vec<&str> = canonical.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_strategy_kinds() {
        assert!(StrategyKind::Pipes.is_order_deterministic());
        assert!(!StrategyKind::Queue.is_order_deterministic());
        assert_eq!(StrategyKind::Sequential.suffix(), "seq");
        assert_eq!(StrategyKind::Pool.to_string(), "pool");

        for kind in StrategyKind::ALL {
            assert_eq!(ExecutionStrategy::new(kind, 2, None).kind(), kind);
        }
    }

    #[test]
    fn test_optimal_workers() {
        assert!(ExecutionStrategy::calculate_optimal_workers(0, 100) >= 1);
        assert!(ExecutionStrategy::calculate_optimal_workers(2, 100) <= 2);
        assert!(ExecutionStrategy::calculate_optimal_workers(0, 1) >= 1);
    }
}
