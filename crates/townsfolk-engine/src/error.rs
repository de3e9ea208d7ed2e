//! Error types for the engine binary.
//!
//! [`EngineError`] covers the failure modes the binary owns itself. Library
//! errors pass through it so `main` can propagate everything with `?`.

use townsfolk_core::config::ConfigError;
use townsfolk_core::runner::RunnerError;
use townsfolk_core::tick::TickError;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Building the scheduler failed.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },

    /// The simulation loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: RunnerError,
    },

    /// Agent spawning failed.
    #[error("spawner error: {message}")]
    Spawner {
        /// Description of the spawner failure.
        message: String,
    },

    /// Writing a snapshot failed.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Encoding a snapshot failed.
    #[error("snapshot encoding error: {source}")]
    Encode {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },
}
