use super::core::{Executor, MergedResult, run_chunk};
use super::partition::{self, Chunking};
use super::progress::Progress;
use crate::archive::{ArchiveName, ArchiveReader};
use crate::error::{PipelineError, Result};
use crate::record::RecordParser;
use crossbeam::channel::bounded;

/// One dedicated worker thread per chunk, each with a private channel
///
/// Every channel has exactly one writer (its worker) and one reader (the
/// collector). The collector starts all workers first, then reads the
/// channels one by one in creation order, which keeps the merged order
/// equal to chunk order. A slow early worker delays consuming later ones.
#[derive(Debug, Clone)]
pub struct PipeExecutor {
    workers: usize,
    chunking: Chunking,
}

impl PipeExecutor {
    pub fn new(workers: usize, chunking: Chunking) -> Self {
        Self { workers, chunking }
    }
}

impl Executor for PipeExecutor {
    fn execute<P: RecordParser>(
        &self,
        archives: &[ArchiveName],
        reader: &ArchiveReader<P>,
        progress: &Progress,
    ) -> Result<MergedResult> {
        let chunks = partition::plan(archives, self.chunking, self.workers)?;

        crossbeam::thread::scope(|s| -> Result<MergedResult> {
            let mut pipes = Vec::with_capacity(chunks.len());
            for chunk in &chunks {
                let (tx, rx) = bounded(1);
                s.builder()
                    .name(format!("zipmerge-pipe-{}", chunk.index))
                    .spawn(move |_| {
                        let _ = tx.send(run_chunk(chunk.index, chunk.archives, reader, progress));
                    })
                    .map_err(PipelineError::Spawn)?;
                pipes.push((chunk.index, rx));
            }

            let mut merged = MergedResult::new();
            for (worker, rx) in pipes {
                match rx.recv() {
                    Ok(Ok(partial)) => merged.append(partial),
                    Ok(Err(e)) => return Err(e),
                    Err(_) => return Err(PipelineError::WorkerLost { worker }),
                }
            }
            Ok(merged)
        })
        .map_err(|_| PipelineError::Panicked("pipes"))?
    }
}
