//! Decoy leaderboard service
//!
//! An hourly background task regenerates a board of 10,000 synthetic
//! records and publishes it to an in-memory snapshot. Two read paths serve
//! the snapshot: an HTML page and a CSV export.
//!
//! # Architecture
//! - **core**: Record, Batch and the snapshot store
//! - **generator**: Real entry cooldown and the periodic generator task
//! - **infrastructure**: Config, logging, metrics, page template, HTTP API
//! - **engine**: Startup wiring and graceful shutdown

pub mod core;
pub mod engine;
pub mod generator;
pub mod infrastructure;

// Re-export commonly used types
pub use infrastructure::config::{Config, ConfigError, Startup, StartupArgs};

use thiserror::Error;

/// Fatal service errors
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Error starting server on {0}: {1}")]
    Bind(String, #[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, BoardError>;
