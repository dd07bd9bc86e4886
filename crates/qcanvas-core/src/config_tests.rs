//! Config module tests

use std::fs;
use std::time::Duration;

use tempfile::TempDir;

use crate::canvas::MalformedPolicy;
use crate::config::{CanvasConfig, Config, LockSettings};

#[test]
fn test_config_default() {
    let config = Config::default();

    // Canvas defaults
    assert_eq!(config.canvas.extension, "canvas");
    assert_eq!(config.canvas.temp_suffix, ".tmp");
    assert_eq!(config.canvas.on_malformed, MalformedPolicy::Recover);

    // Lock defaults
    assert!(config.lock.enabled);
    assert_eq!(config.lock.timeout_ms, 2000);
    assert_eq!(config.lock.retry_interval_ms, 50);
    assert_eq!(config.lock.ttl_secs, 60);

    assert!(config.validate().is_ok());
}

#[test]
fn test_lock_settings_conversion() {
    let settings = LockSettings {
        enabled: false,
        timeout_ms: 750,
        retry_interval_ms: 25,
        ttl_secs: 5,
    };

    let lock = settings.to_lock_config();
    assert!(!lock.enabled);
    assert_eq!(lock.timeout, Duration::from_millis(750));
    assert_eq!(lock.retry_interval, Duration::from_millis(25));
    assert_eq!(lock.ttl, Duration::from_secs(5));
}

#[test]
fn test_load_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.set("canvas.on_malformed", "fail").unwrap();
    config.set("lock.timeout_ms", "500").unwrap();
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.canvas.on_malformed, MalformedPolicy::Fail);
    assert_eq!(loaded.lock.timeout_ms, 500);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[lock]\nenabled = false\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert!(!config.lock.enabled);
    assert_eq!(config.lock.timeout_ms, 2000);
    assert_eq!(config.canvas, CanvasConfig::default());
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    fs::write(&path, "[canvas\n").unwrap();
    assert!(Config::load_from(&path).is_err());

    fs::write(&path, "[canvas]\nextension = \".canvas\"\n").unwrap();
    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("canvas.extension"));
}

#[test]
fn test_get_set() {
    let mut config = Config::default();

    config.set("canvas.extension", ".board").unwrap();
    assert_eq!(config.get("canvas.extension").unwrap(), "board");

    config.set("canvas.on_malformed", "FAIL").unwrap();
    assert_eq!(config.get("canvas.on_malformed").unwrap(), "fail");

    config.set("lock.enabled", "false").unwrap();
    assert_eq!(config.get("lock.enabled").unwrap(), "false");

    config.set("lock.ttl_secs", "120").unwrap();
    assert_eq!(config.get("lock.ttl_secs").unwrap(), "120");
}

#[test]
fn test_set_rejects_bad_values() {
    let mut config = Config::default();

    assert!(config.set("canvas.on_malformed", "ignore").is_err());
    assert!(config.set("lock.enabled", "maybe").is_err());
    assert!(config.set("lock.timeout_ms", "-1").is_err());
    assert!(config.set("lock.retry_interval_ms", "0").is_err());
    assert!(config.set("canvas.temp_suffix", "a/b").is_err());
}

#[test]
fn test_unknown_key() {
    let mut config = Config::default();

    let err = config.get("canvas.width").unwrap_err();
    assert!(err.to_string().contains("Unknown configuration key"));
    assert!(config.set("canvas.width", "800").is_err());
}

#[test]
fn test_list_covers_every_key() {
    let config = Config::default();
    let entries = config.list().unwrap();

    assert_eq!(entries.len(), 7);
    assert!(entries.contains(&("canvas.extension".to_string(), "canvas".to_string())));
    assert!(entries.contains(&("lock.ttl_secs".to_string(), "60".to_string())));
}

#[test]
fn test_rejected_value_leaves_config_unchanged() {
    let mut config = Config::default();

    assert!(config.set("canvas.extension", "a/b").is_err());
    assert!(config.set("canvas.temp_suffix", "").is_err());
    assert!(config.set("lock.retry_interval_ms", "0").is_err());

    assert_eq!(config, Config::default());
    assert!(config.validate().is_ok());
}

#[test]
fn test_default_is_sum_of_section_defaults() {
    let config = Config::default();
    assert_eq!(config.canvas, CanvasConfig::default());
    assert_eq!(config.lock, LockSettings::default());
}
