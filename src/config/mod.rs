//! Configuration management for zipmerge
//!
//! Settings are layered with figment: embedded defaults, then user and
//! repository files (TOML, JSON or YAML), then `ZIPMERGE_` environment
//! variables, then command-line flags.

use crate::parallel::{ExecutionStrategy, StrategyKind};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod core;

pub use self::core::ZipmergeConfig;

/// Fully merged, typed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub input: InputConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
    pub progress: ProgressConfig,
}

/// Where archives are discovered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory scanned (non-recursively) for archives
    pub directory: String,

    /// Archive file extension, compared case-insensitively
    pub extension: String,
}

/// Strategy selection and worker sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub strategy: StrategyKind,

    /// Exact worker count (0 = derive from cores and the limits below)
    #[serde(default)]
    pub workers: usize,

    /// Maximum number of workers (0 = no limit)
    pub max_threads: usize,

    /// Percentage of CPU cores to use (1-100)
    pub thread_percentage: u8,

    /// Archives per chunk (0 = derive from the worker count)
    #[serde(default)]
    pub chunk_size: usize,
}

/// Output table locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub level_table: String,
    pub object_table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    pub enabled: bool,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.pipeline.thread_percentage) {
            bail!(
                "pipeline.thread_percentage must be between 1 and 100, got {}",
                self.pipeline.thread_percentage
            );
        }
        if self.input.extension.is_empty() {
            bail!("input.extension must not be empty");
        }
        Ok(())
    }

    pub fn input_dir(&self) -> PathBuf {
        PathBuf::from(&self.input.directory)
    }

    /// Explicit worker count, or cores scaled by percentage and thread limit
    pub fn workers(&self) -> usize {
        if self.pipeline.workers > 0 {
            return self.pipeline.workers;
        }
        ExecutionStrategy::calculate_optimal_workers(
            self.pipeline.max_threads,
            self.pipeline.thread_percentage,
        )
    }

    pub fn chunk_size(&self) -> Option<usize> {
        (self.pipeline.chunk_size > 0).then_some(self.pipeline.chunk_size)
    }

    /// The configured strategy, sized for this machine
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy_for(self.pipeline.strategy)
    }

    /// Any strategy, sized with the configured worker settings
    pub fn strategy_for(&self, kind: StrategyKind) -> ExecutionStrategy {
        ExecutionStrategy::new(kind, self.workers(), self.chunk_size())
    }
}
