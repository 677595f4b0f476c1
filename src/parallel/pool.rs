use super::core::{Executor, MergedResult, PartialResult, run_chunk};
use super::partition::{self, Chunking};
use super::progress::Progress;
use crate::archive::{ArchiveName, ArchiveReader};
use crate::error::{PipelineError, Result};
use crate::record::RecordParser;
use crossbeam::channel::{Receiver, Select, bounded};

/// Fixed-size worker pool with one task per chunk
///
/// Each submitted task owns a private single-use result channel, its future.
/// The collector waits on all pending futures at once and appends whichever
/// completes first, so the merged order follows completion order.
#[derive(Debug, Clone)]
pub struct PoolExecutor {
    workers: usize,
    chunking: Chunking,
}

/// Pending result of one pooled task
struct TaskFuture {
    chunk: usize,
    rx: Receiver<Result<PartialResult>>,
}

impl PoolExecutor {
    pub fn new(workers: usize, chunking: Chunking) -> Self {
        Self { workers, chunking }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Drain every future in completion order, aborting on the first failure
    fn as_completed(futures: &[TaskFuture]) -> Result<MergedResult> {
        let mut merged = MergedResult::new();
        let mut select = Select::new();
        for future in futures {
            select.recv(&future.rx);
        }

        for _ in 0..futures.len() {
            let operation = select.select();
            let index = operation.index();
            let future = &futures[index];

            match operation.recv(&future.rx) {
                Ok(Ok(partial)) => merged.append(partial),
                Ok(Err(e)) => return Err(e),
                Err(_) => return Err(PipelineError::WorkerLost { worker: future.chunk }),
            }
            select.remove(index);
        }

        Ok(merged)
    }
}

impl Executor for PoolExecutor {
    fn execute<P: RecordParser>(
        &self,
        archives: &[ArchiveName],
        reader: &ArchiveReader<P>,
        progress: &Progress,
    ) -> Result<MergedResult> {
        let chunks = partition::plan(archives, self.chunking, self.workers)?;
        if chunks.is_empty() {
            return Ok(MergedResult::new());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("zipmerge-pool-{i}"))
            .build()?;

        tracing::debug!("Submitting {} tasks to a pool of {} workers", chunks.len(), self.workers);

        // Tasks may still be running when the collector bails out; the scope
        // joins them before returning and their late results are dropped.
        pool.in_place_scope(|scope| {
            let mut futures = Vec::with_capacity(chunks.len());
            for chunk in &chunks {
                let (tx, rx) = bounded(1);
                scope.spawn(move |_| {
                    let _ = tx.send(run_chunk(chunk.index, chunk.archives, reader, progress));
                });
                futures.push(TaskFuture { chunk: chunk.index, rx });
            }

            Self::as_completed(&futures)
        })
    }
}
