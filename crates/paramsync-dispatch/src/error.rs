//! Error types for scheduler construction and configuration.
//!
//! Scheduling and draining never return errors; see the crate docs.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring or starting a scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Failed to read a configuration file
    #[error("failed to read scheduler config '{path}': {source}")]
    ReadConfig {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse scheduler config: {0}")]
    ParseConfig(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize scheduler config: {0}")]
    SerializeConfig(#[from] toml::ser::Error),

    /// Worker thread name is empty or contains a NUL byte
    #[error("invalid worker thread name {0:?}")]
    InvalidThreadName(String),

    /// The OS refused to create the background worker thread
    #[error("failed to spawn background worker: {0}")]
    SpawnWorker(#[source] std::io::Error),
}

impl SchedulerError {
    /// Create a read config error.
    pub fn read_config(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SchedulerError::ReadConfig {
            path: path.into(),
            source,
        }
    }
}
