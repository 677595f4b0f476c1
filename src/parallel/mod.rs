//! Partition, dispatch, collect and merge
//!
//! This module turns an archive list into a [`MergedResult`] using one of four
//! interchangeable execution strategies. All of them share the same contract:
//! the record multiset never depends on the strategy, and any worker failure
//! fails the whole run with no partial output.
//!
//! # Strategies
//!
//! ```text
//! ┌────────────┬──────────────────────────────┬──────────────────────┬──────────────┐
//! │ Strategy   │ Workers                      │ Collection           │ Merge order  │
//! ├────────────┼──────────────────────────────┼──────────────────────┼──────────────┤
//! │ sequential │ caller thread                │ none                 │ chunk order  │
//! │ pool       │ fixed rayon pool, task/chunk │ futures, completion  │ varies       │
//! │ pipes      │ one thread per chunk         │ private channel each │ chunk order  │
//! │ queue      │ one thread per chunk         │ one shared channel   │ varies       │
//! └────────────┴──────────────────────────────┴──────────────────────┴──────────────┘
//! ```
//!
//! Pool and queue runs merge in whatever order chunks finish. Downstream table
//! writing treats record order as insignificant, so only content is compared
//! across strategies.
//!
//! # Failure signalling
//!
//! Every worker reports exactly once, either its [`PartialResult`] or an error,
//! before it terminates. Panics are caught inside the worker and reported as
//! [`PipelineError::WorkerLost`](crate::error::PipelineError::WorkerLost); a
//! result channel that disconnects without a message is treated the same way.
//!
//! # Example
//!
//! ```rust,no_run
//! use zipmerge::archive::{ArchiveReader, discover_archives};
//! use zipmerge::parallel::{ExecutionStrategy, Progress, StrategyKind};
//! use zipmerge::record::XmlRecordParser;
//! use std::path::Path;
//!
//! let archives = discover_archives(Path::new("data"), "zip")?;
//! let workers = ExecutionStrategy::calculate_optimal_workers(0, 100);
//! let strategy = ExecutionStrategy::new(StrategyKind::Queue, workers, None);
//!
//! let reader = ArchiveReader::new(XmlRecordParser::new());
//! let merged = strategy.execute(&archives, &reader, &Progress::hidden(archives.len()))?;
//! println!("{} records", merged.len());
//! # Ok::<(), zipmerge::error::PipelineError>(())
//! ```

pub mod core;
pub mod partition;
pub mod pipes;
pub mod pool;
pub mod progress;
pub mod queue;
pub mod sequential;

pub use self::core::{ExecutionStrategy, Executor, MergedResult, PartialResult, StrategyKind};
pub use partition::{Chunk, Chunking};
pub use progress::Progress;
