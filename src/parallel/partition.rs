//! Size-based splitting of the archive list into contiguous chunks
//!
//! Chunk boundaries depend only on the number of archives and the chunk size.
//! Archive contents and sizes on disk are never inspected.

use crate::archive::ArchiveName;
use crate::error::{PipelineError, Result};

/// A contiguous, non-overlapping run of archives assigned to one worker
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    /// Position of this chunk in the partition, also used as the worker id
    pub index: usize,
    pub archives: &'a [ArchiveName],
}

impl Chunk<'_> {
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }
}

/// How a strategy derives its chunk size from the archive and worker counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunking {
    /// One chunk holding every archive
    Whole,
    /// `ceil(N / workers)`: about one chunk per worker
    PerWorker,
    /// `ceil(2N / workers)`: about one chunk per two workers, fewer thread start-ups
    Coarse,
    /// Explicit chunk size
    Fixed(usize),
}

impl Chunking {
    /// Chunk size for `archive_count` archives spread over `workers`
    ///
    /// Never returns zero, so an empty archive list still partitions cleanly
    /// into zero chunks.
    pub fn chunk_size(&self, archive_count: usize, workers: usize) -> Result<usize> {
        if workers == 0 {
            return Err(PipelineError::Partition(
                "worker count must be at least 1".to_string(),
            ));
        }

        let size = match *self {
            Chunking::Whole => archive_count,
            Chunking::PerWorker => archive_count.div_ceil(workers),
            Chunking::Coarse => (2 * archive_count).div_ceil(workers),
            Chunking::Fixed(0) => {
                return Err(PipelineError::Partition(
                    "chunk size must be at least 1".to_string(),
                ));
            }
            Chunking::Fixed(size) => size,
        };

        Ok(size.max(1))
    }
}

/// Split `archives` into chunks of `chunk_size` (the last one may be shorter)
pub fn partition(archives: &[ArchiveName], chunk_size: usize) -> Result<Vec<Chunk<'_>>> {
    if chunk_size == 0 {
        return Err(PipelineError::Partition(
            "chunk size must be at least 1".to_string(),
        ));
    }

    Ok(archives
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, archives)| Chunk { index, archives })
        .collect())
}

/// Derive the chunk size with `chunking` and split `archives` accordingly
pub fn plan<'a>(
    archives: &'a [ArchiveName],
    chunking: Chunking,
    workers: usize,
) -> Result<Vec<Chunk<'a>>> {
    let chunk_size = chunking.chunk_size(archives.len(), workers)?;
    let chunks = partition(archives, chunk_size)?;
    tracing::debug!(
        "Partitioned {} archives into {} chunks of up to {} ({:?}, {} workers)",
        archives.len(),
        chunks.len(),
        chunk_size,
        chunking,
        workers
    );
    Ok(chunks)
}
