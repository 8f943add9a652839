//! Infrastructure
//!
//! Everything around the board itself:
//! - Configuration and startup parameters
//! - Logging and metrics
//! - Page template and HTTP API

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod template;

pub use api::{router, start_server, AppState};
pub use metrics::BoardMetrics;
