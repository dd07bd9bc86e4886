//! Storage layer
//!
//! Crash-safe persistence of canvas files.

pub mod atomic;

pub use atomic::{AtomicWriter, DEFAULT_TEMP_SUFFIX, StagedWrite};
