//! Per-path advisory locking
//!
//! Serializes load/save cycles on the same canvas across processes. Without
//! it, two overlapping commits would each load the same snapshot and the later
//! save would silently drop the earlier entry.
//!
//! # Example
//!
//! ```no_run
//! use qcanvas_core::locking::{LockConfig, PathLock};
//! use std::path::Path;
//!
//! let lock = PathLock::new(LockConfig::default());
//! let _guard = lock.acquire(Path::new("deck.canvas"), "example")?;
//! // load, mutate, save...
//! // the lock file is removed when the guard is dropped
//! # Ok::<(), qcanvas_core::locking::LockError>(())
//! ```

pub mod manager;
pub mod types;

pub use manager::{LOCK_SUFFIX, PathLock, PathLockGuard, lock_file_path, read_lock_file};
pub use types::{LockConfig, LockError, LockInfo, LockResult};
