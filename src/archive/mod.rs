//! Archive naming, discovery and reading
//!
//! An archive is a zip container whose entries each hold one record document.
//! The set of archives for a run is discovered once and never mutated.

mod reader;

pub use reader::ArchiveReader;

use crate::error::{PipelineError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Identifies one archive on disk
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchiveName(PathBuf);

impl ArchiveName {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for ArchiveName {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

/// List the archives directly inside `dir`
///
/// Only regular files whose extension equals `extension` (ignoring ASCII case)
/// are returned. Subdirectories are not searched. Names are sorted so repeated
/// runs over the same directory see the same sequence.
pub fn discover_archives(dir: &Path, extension: &str) -> Result<Vec<ArchiveName>> {
    let mut archives = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| PipelineError::Discover {
            path: dir.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));

        if matches {
            archives.push(ArchiveName::new(entry.into_path()));
        }
    }

    archives.sort();
    tracing::debug!("Discovered {} archives in {}", archives.len(), dir.display());
    Ok(archives)
}
