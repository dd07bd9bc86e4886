//! Target path validation

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Clean up a raw path as it arrives from a clipboard or prompt and check
/// that it names an existing file with the expected extension
///
/// Surrounding whitespace and double quotes are stripped ("Copy as path" on
/// Windows quotes the path). The extension is compared case-insensitively.
pub fn resolve_target(raw: &str, extension: &str) -> Result<PathBuf> {
    let cleaned = raw.trim_matches(|c: char| c.is_whitespace() || c == '"');
    if cleaned.is_empty() {
        return Err(Error::invalid_target(raw, "no path given"));
    }

    let path = PathBuf::from(cleaned);

    let matches_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension));
    if !matches_extension {
        return Err(Error::invalid_target(
            path,
            format!("expected a .{} file", extension),
        ));
    }

    if !path.exists() {
        return Err(Error::invalid_target(path, "file does not exist"));
    }
    if !path.is_file() {
        return Err(Error::invalid_target(path, "not a regular file"));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_accepts_existing_canvas() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deck.canvas");
        fs::write(&path, "{}").unwrap();

        assert_eq!(resolve_target(path.to_str().unwrap(), "canvas").unwrap(), path);
    }

    #[test]
    fn test_strips_quotes_and_whitespace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deck.canvas");
        fs::write(&path, "{}").unwrap();

        let raw = format!("  \"{}\"\r\n", path.display());
        assert_eq!(resolve_target(&raw, "canvas").unwrap(), path);
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Deck.CANVAS");
        fs::write(&path, "{}").unwrap();

        assert!(resolve_target(path.to_str().unwrap(), "canvas").is_ok());
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "# hi").unwrap();

        let err = resolve_target(path.to_str().unwrap(), "canvas").unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { .. }));
        assert!(err.to_string().contains(".canvas"));
    }

    #[test]
    fn test_rejects_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.canvas");

        let err = resolve_target(path.to_str().unwrap(), "canvas").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_rejects_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("folder.canvas");
        fs::create_dir(&path).unwrap();

        let err = resolve_target(path.to_str().unwrap(), "canvas").unwrap_err();
        assert!(err.to_string().contains("not a regular file"));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            resolve_target("  \"\" ", "canvas"),
            Err(Error::InvalidTarget { .. })
        ));
    }
}
