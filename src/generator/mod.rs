//! Background generation
//!
//! - Cooldown: decides when the real record may appear again
//! - Generator: periodic build-and-publish task

pub mod cooldown;
pub mod task;

pub use cooldown::RealEntryCooldown;
pub use task::{CycleReport, Generator};
