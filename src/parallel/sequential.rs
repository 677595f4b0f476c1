use super::core::{Executor, MergedResult, PartialResult};
use super::progress::Progress;
use crate::archive::{ArchiveName, ArchiveReader};
use crate::error::{PipelineError, Result};
use crate::record::RecordParser;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Baseline strategy: the caller reads every archive in order
///
/// The whole archive list is a single chunk, so the merged order is the
/// archive order and failures are returned unwrapped. A panic while reading
/// is reported as [`PipelineError::WorkerLost`] for chunk 0, the same way the
/// concurrent strategies report a vanished worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn execute<P: RecordParser>(
        &self,
        archives: &[ArchiveName],
        reader: &ArchiveReader<P>,
        progress: &Progress,
    ) -> Result<MergedResult> {
        let mut merged = MergedResult::new();
        if archives.is_empty() {
            return Ok(merged);
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let mut records = Vec::new();
            for archive in archives {
                records.extend(reader.read(archive)?);
                progress.archive_done();
            }
            Ok::<_, PipelineError>(records)
        }));

        let records = match outcome {
            Ok(records) => records?,
            Err(_) => {
                tracing::error!("Sequential run panicked");
                return Err(PipelineError::WorkerLost { worker: 0 });
            }
        };

        merged.append(PartialResult { chunk: 0, records });
        Ok(merged)
    }
}
