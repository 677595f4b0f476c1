use super::core::{Executor, MergedResult, PartialResult, run_chunk};
use super::partition::{self, Chunking};
use super::progress::Progress;
use crate::archive::{ArchiveName, ArchiveReader};
use crate::error::{PipelineError, Result};
use crate::record::RecordParser;
use crossbeam::channel::{Receiver, unbounded};
use std::collections::HashSet;

/// One dedicated worker thread per chunk, all writing to one shared channel
///
/// The collector performs exactly one receive per chunk and appends results
/// in arrival order.
#[derive(Debug, Clone)]
pub struct QueueExecutor {
    workers: usize,
    chunking: Chunking,
}

impl QueueExecutor {
    pub fn new(workers: usize, chunking: Chunking) -> Self {
        Self { workers, chunking }
    }

    fn drain(rx: Receiver<Result<PartialResult>>, expected: usize) -> Result<MergedResult> {
        let mut merged = MergedResult::new();
        let mut arrived = HashSet::with_capacity(expected);

        for _ in 0..expected {
            match rx.recv() {
                Ok(Ok(partial)) => {
                    arrived.insert(partial.chunk);
                    merged.append(partial);
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    // Every sender is gone; blame the first chunk that never reported
                    let worker = (0..expected).find(|i| !arrived.contains(i)).unwrap_or(0);
                    return Err(PipelineError::WorkerLost { worker });
                }
            }
        }

        Ok(merged)
    }
}

impl Executor for QueueExecutor {
    fn execute<P: RecordParser>(
        &self,
        archives: &[ArchiveName],
        reader: &ArchiveReader<P>,
        progress: &Progress,
    ) -> Result<MergedResult> {
        let chunks = partition::plan(archives, self.chunking, self.workers)?;
        let (tx, rx) = unbounded();

        crossbeam::thread::scope(|s| -> Result<MergedResult> {
            for chunk in &chunks {
                let tx = tx.clone();
                s.builder()
                    .name(format!("zipmerge-queue-{}", chunk.index))
                    .spawn(move |_| {
                        let _ = tx.send(run_chunk(chunk.index, chunk.archives, reader, progress));
                    })
                    .map_err(PipelineError::Spawn)?;
            }
            drop(tx);

            Self::drain(rx, chunks.len())
        })
        .map_err(|_| PipelineError::Panicked("queue"))?
    }
}
