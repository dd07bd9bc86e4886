//! qcanvas Core Library
//!
//! This crate provides the core functionality for qcanvas, including:
//! - Canvas document model with lossless round trips
//! - Blank-slot search and question/answer card placement
//! - Crash-safe persistence through a temp file and atomic rename
//! - Advisory per-path locking
//! - Session orchestration across capture triggers
//! - Configuration

pub mod canvas;
pub mod config;
pub mod error;
pub mod locking;
pub mod session;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::canvas::{Canvas, Edge, Mutation, Node, Side};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::session::{InputSource, Outcome, Session, Trigger};
}

#[cfg(test)]
mod config_tests;
