//! Per-user progress tracking
//!
//! This module provides:
//! - Node and module progress models
//! - The tracker, the single mutation point for node state
//! - JSON persistence of the progress snapshot and interaction cursor

pub mod models;
pub mod storage;
pub mod tracker;

pub use models::*;
pub use storage::{ProgressError, ProgressStorage, SessionCursor};
pub use tracker::ProgressTracker;
