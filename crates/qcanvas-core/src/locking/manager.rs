//! Advisory lock files guarding one canvas path
//!
//! The lock is a sibling file `<name>.lock` created with `create_new`, so only
//! one process can hold it. Its JSON body records the holder so that a lock
//! left behind by a dead or expired holder can be reclaimed.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::types::{LockConfig, LockError, LockInfo, LockResult};

/// Suffix appended to the guarded file's name
pub const LOCK_SUFFIX: &str = ".lock";

/// How old an unparseable lock file must be before it is treated as stale
const UNREADABLE_GRACE: Duration = Duration::from_secs(2);

/// Path of the lock file guarding `path`
pub fn lock_file_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("canvas"));
    name.push(LOCK_SUFFIX);
    path.with_file_name(name)
}

/// Holds a path lock; the lock file is removed on drop
#[derive(Debug)]
pub struct PathLockGuard {
    lock_file: PathBuf,
    info: LockInfo,
}

impl PathLockGuard {
    pub fn lock_file(&self) -> &Path {
        &self.lock_file
    }

    pub fn info(&self) -> &LockInfo {
        &self.info
    }
}

impl Drop for PathLockGuard {
    fn drop(&mut self) {
        match remove_if_unchanged(&self.lock_file, Some(&self.info)) {
            Ok(true) => debug!(lock_file = %self.lock_file.display(), "Lock released"),
            Ok(false) => warn!(
                lock_file = %self.lock_file.display(),
                "Lock file now belongs to another holder, leaving it in place"
            ),
            Err(e) => warn!(
                lock_file = %self.lock_file.display(),
                error = %e,
                "Failed to remove lock file"
            ),
        }
    }
}

/// Acquires advisory locks on canvas paths
#[derive(Debug, Clone, Default)]
pub struct PathLock {
    config: LockConfig,
}

impl PathLock {
    pub fn new(config: LockConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Acquire the lock for `path`, waiting up to the configured timeout
    ///
    /// Returns `None` when locking is disabled.
    pub fn acquire(&self, path: &Path, holder_description: &str) -> LockResult<Option<PathLockGuard>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let lock_file = lock_file_path(path);
        let start = Instant::now();

        debug!(
            lock_file = %lock_file.display(),
            timeout_ms = self.config.timeout.as_millis(),
            "Attempting to acquire lock"
        );

        loop {
            match self.try_create(&lock_file, holder_description)? {
                Some(info) => {
                    info!(
                        lock_file = %lock_file.display(),
                        elapsed_ms = start.elapsed().as_millis(),
                        "Lock acquired"
                    );
                    return Ok(Some(PathLockGuard { lock_file, info }));
                }
                None => {
                    let holder = match read_lock_file(&lock_file) {
                        Ok(existing) if existing.is_expired() || !is_process_alive(existing.holder_pid) => {
                            warn!(
                                lock_file = %lock_file.display(),
                                holder_pid = existing.holder_pid,
                                "Cleaning up stale lock"
                            );
                            remove_if_unchanged(&lock_file, Some(&existing))?;
                            continue;
                        }
                        Ok(existing) => existing.holder(),
                        // Released between our create attempt and the read
                        Err(_) if !lock_file.exists() => continue,
                        Err(e) if file_age(&lock_file) >= UNREADABLE_GRACE => {
                            warn!(lock_file = %lock_file.display(), error = %e, "Cleaning up unreadable lock");
                            remove_if_unchanged(&lock_file, None)?;
                            continue;
                        }
                        // The holder may still be writing its lock info
                        Err(_) => "unknown holder".to_string(),
                    };

                    if start.elapsed() >= self.config.timeout {
                        return Err(LockError::Timeout {
                            resource: path.display().to_string(),
                            holder,
                        });
                    }
                    sleep(self.config.retry_interval);
                }
            }
        }
    }

    /// Create the lock file if nobody holds it; `None` when it already exists
    fn try_create(&self, lock_file: &Path, holder_description: &str) -> LockResult<Option<LockInfo>> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(lock_file) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(None),
            Err(e) => {
                return Err(LockError::IoError(format!(
                    "Failed to create lock file {}: {}",
                    lock_file.display(),
                    e
                )));
            }
        };

        let info = LockInfo::new(holder_description, self.config.ttl);
        let json = serde_json::to_string_pretty(&info)
            .map_err(|e| LockError::IoError(format!("Failed to serialize lock info: {}", e)))?;

        if let Err(e) = file.write_all(json.as_bytes()) {
            let _ = fs::remove_file(lock_file);
            return Err(LockError::IoError(format!("Failed to write lock file: {}", e)));
        }

        Ok(Some(info))
    }
}

/// Read lock info from a file
pub fn read_lock_file(path: &Path) -> LockResult<LockInfo> {
    let contents = fs::read_to_string(path)
        .map_err(|e| LockError::IoError(format!("Failed to read lock file: {}", e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| LockError::Corrupted(format!("Failed to parse lock file: {}", e)))
}

fn file_age(path: &Path) -> Duration {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .unwrap_or(Duration::ZERO)
}

/// Remove `lock_file` only if it still holds `expected` (`None` meaning it is
/// still unreadable)
///
/// The file is renamed aside before it is inspected, so a lock that another
/// process created after `expected` was observed is put back instead of
/// deleted. Returns false when the file turned out to be someone else's.
fn remove_if_unchanged(lock_file: &Path, expected: Option<&LockInfo>) -> LockResult<bool> {
    let aside = aside_path(lock_file);
    match fs::rename(lock_file, &aside) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
        Err(e) => {
            return Err(LockError::IoError(format!(
                "Failed to move lock file aside: {}",
                e
            )));
        }
    }

    let unchanged = match (read_lock_file(&aside), expected) {
        (Ok(found), Some(expected)) => found == *expected,
        (Err(_), None) => true,
        _ => false,
    };

    if !unchanged {
        match fs::hard_link(&aside, lock_file) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => warn!(
                lock_file = %lock_file.display(),
                "Lock file was recreated while being checked"
            ),
            // No hard links on this filesystem
            Err(_) => {
                return fs::rename(&aside, lock_file)
                    .map(|()| false)
                    .map_err(|e| LockError::IoError(format!("Failed to restore lock file: {}", e)));
            }
        }
    }

    if let Err(e) = fs::remove_file(&aside) {
        warn!(file = %aside.display(), error = %e, "Failed to remove moved lock file");
    }
    Ok(unchanged)
}

fn aside_path(lock_file: &Path) -> PathBuf {
    let mut name = lock_file
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(format!(".{}", Uuid::new_v4().simple()));
    lock_file.with_file_name(name)
}

/// Check if a process is still alive
fn is_process_alive(pid: u32) -> bool {
    if pid == std::process::id() {
        return true;
    }

    #[cfg(unix)]
    {
        use std::process::Command;
        Command::new("kill")
            .args(["-0", &pid.to_string()])
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[cfg(windows)]
    {
        use std::process::Command;
        Command::new("tasklist")
            .args(["/FI", &format!("PID eq {}", pid)])
            .output()
            .map(|o| String::from_utf8_lossy(&o.stdout).contains(&pid.to_string()))
            .unwrap_or(false)
    }

    #[cfg(not(any(unix, windows)))]
    {
        true
    }
}
