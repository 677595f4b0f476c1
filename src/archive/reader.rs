use super::ArchiveName;
use crate::error::{PipelineError, Result};
use crate::record::{Record, RecordParser};
use std::fs::File;
use std::io::{BufReader, Read};
use zip::ZipArchive;
use zip::result::ZipError;

/// Opens archives and applies a [`RecordParser`] to every entry
///
/// The first failing entry aborts the archive: no partial record list is
/// ever returned.
pub struct ArchiveReader<P> {
    parser: P,
}

impl<P: RecordParser> ArchiveReader<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    /// Parse every entry of one archive, in entry-listing order
    pub fn read(&self, archive: &ArchiveName) -> Result<Vec<Record>> {
        let open_error = |source: ZipError| PipelineError::ArchiveOpen {
            archive: archive.clone(),
            source,
        };

        let file = File::open(archive.path()).map_err(|e| open_error(e.into()))?;
        let mut zip = ZipArchive::new(BufReader::new(file)).map_err(open_error)?;

        let mut records = Vec::with_capacity(zip.len());
        let mut buffer = Vec::new();

        for index in 0..zip.len() {
            let mut entry = zip.by_index(index).map_err(open_error)?;
            if entry.is_dir() {
                continue;
            }

            buffer.clear();
            entry
                .read_to_end(&mut buffer)
                .map_err(|e| open_error(e.into()))?;

            let record = self
                .parser
                .parse(&buffer)
                .map_err(|source| PipelineError::RecordParse {
                    archive: archive.clone(),
                    entry: entry.name().to_string(),
                    source,
                })?;
            records.push(record);
        }

        tracing::debug!("Read {} records from {}", records.len(), archive);
        Ok(records)
    }
}
