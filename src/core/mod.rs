//! Core board types
//!
//! - Record: one board row and its CSV projection
//! - Batch: a full generated board
//! - SnapshotStore: the currently published batch

pub mod batch;
pub mod record;
pub mod snapshot;

pub use batch::{Batch, BATCH_SIZE};
pub use record::Record;
pub use snapshot::SnapshotStore;
