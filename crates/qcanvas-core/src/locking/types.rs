//! Lock types and error definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type for lock operations
pub type LockResult<T> = std::result::Result<T, LockError>;

/// Lock errors
#[derive(Error, Debug, Clone)]
pub enum LockError {
    /// Lock acquisition timed out
    #[error("Lock timeout: '{resource}' is held by {holder}")]
    Timeout { resource: String, holder: String },

    /// I/O error during lock operations
    #[error("Lock I/O error: {0}")]
    IoError(String),

    /// Lock file could not be parsed
    #[error("Lock file corrupted: {0}")]
    Corrupted(String),
}

impl LockError {
    /// Get error code for this lock error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "E500",
            Self::IoError(_) => "E501",
            Self::Corrupted(_) => "E502",
        }
    }
}

/// Contents of a lock file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Process ID of lock holder
    pub holder_pid: u32,

    /// Description of the lock holder (e.g. "qcanvas add")
    pub holder_description: String,

    /// When the lock was acquired
    pub acquired_at: DateTime<Utc>,

    /// When the lock expires
    pub expires_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create lock info for the current process
    pub fn new(holder_description: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            holder_pid: std::process::id(),
            holder_description: holder_description.into(),
            acquired_at: now,
            expires_at: now + chrono::Duration::from_std(ttl).unwrap_or_default(),
        }
    }

    /// Check if the lock is expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Human-readable holder, used in timeout errors
    pub fn holder(&self) -> String {
        format!("pid:{} ({})", self.holder_pid, self.holder_description)
    }
}

/// Configuration for path locks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockConfig {
    /// Whether locks are taken at all
    pub enabled: bool,

    /// How long to wait for a held lock
    pub timeout: Duration,

    /// Retry interval when waiting for a lock
    pub retry_interval: Duration,

    /// How long a lock stays valid before it is considered stale
    pub ttl: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: Duration::from_millis(2000),
            retry_interval: Duration::from_millis(50),
            ttl: Duration::from_secs(60),
        }
    }
}

impl LockConfig {
    /// Config with locking turned off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the acquisition timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the lock TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("test-holder", Duration::from_secs(60));

        assert_eq!(info.holder_pid, std::process::id());
        assert_eq!(info.holder_description, "test-holder");
        assert!(info.expires_at > info.acquired_at);
        assert!(!info.is_expired());
        assert!(info.holder().contains("test-holder"));
    }

    #[test]
    fn test_zero_ttl_expires() {
        let mut info = LockInfo::new("test", Duration::ZERO);
        info.expires_at -= chrono::Duration::seconds(1);
        assert!(info.is_expired());
    }

    #[test]
    fn test_lock_error_codes() {
        let timeout_err = LockError::Timeout {
            resource: "deck.canvas".to_string(),
            holder: "pid:1".to_string(),
        };
        assert_eq!(timeout_err.code(), "E500");
        assert!(timeout_err.to_string().contains("deck.canvas"));

        assert_eq!(LockError::IoError("x".to_string()).code(), "E501");
        assert_eq!(LockError::Corrupted("x".to_string()).code(), "E502");
    }

    #[test]
    fn test_lock_config_builder() {
        let config = LockConfig::default()
            .with_timeout(Duration::from_millis(10))
            .with_ttl(Duration::from_secs(5));

        assert!(config.enabled);
        assert_eq!(config.timeout, Duration::from_millis(10));
        assert_eq!(config.ttl, Duration::from_secs(5));
        assert!(!LockConfig::disabled().enabled);
    }
}
