//! # zipmerge
//!
//! Reads XML records out of a directory of zip archives and reduces them into
//! two flat CSV tables:
//!
//! - `id-level.csv`: one `id,level` row per record
//! - `id-object.csv`: one `id,object` row per object of every record
//!
//! The interesting part is the aggregation: archives are partitioned into
//! chunks and merged by one of four interchangeable strategies (see
//! [`parallel`]). Every strategy yields the same record multiset; only the
//! row order and the wall-clock time differ.
//!
//! ## Quick Start
//!
//! ```bash
//! # Write 50 archives of 1000 records each
//! zipmerge generate --dir data
//!
//! # Merge them with the shared-queue strategy
//! zipmerge run --dir data --strategy queue
//!
//! # Time all strategies against each other
//! zipmerge compare --dir data --repeat 3
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod parallel;
pub mod pipeline;
pub mod record;
pub mod tables;

pub use cli::{Cli, Output};
pub use config::ZipmergeConfig;
pub use error::{PipelineError, RecordParseError, Result};
pub use pipeline::{Pipeline, RunReport};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
