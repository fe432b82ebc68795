//! Filesystem utilities.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Replace a file's contents atomically via a temporary file in the same directory.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

/// Find files matching glob patterns relative to a base directory.
///
/// Results keep pattern order; matches within one pattern are sorted.
/// Malformed patterns are logged and skipped.
pub fn glob_files(base: &Path, patterns: &[String]) -> Vec<PathBuf> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let entries = match glob(&full_pattern.to_string_lossy()) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Skipping invalid glob pattern `{}`: {}", pattern, e);
                continue;
            }
        };

        let mut matches: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();
        matches.sort();

        for path in matches {
            if !results.contains(&path) {
                results.push(path);
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_string_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a").join("b").join("file.txt");
        write_string(&path, "hello").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_write_atomic_replaces() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        write_atomic(&path, "a = \"1\"\n").unwrap();
        write_atomic(&path, "a = \"2\"\n").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "a = \"2\"\n");
    }

    #[test]
    fn test_glob_files_dedups_in_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("docker-compose.yml"), "").unwrap();
        fs::write(tmp.path().join("docker-compose.override.yml"), "").unwrap();

        let files = glob_files(
            tmp.path(),
            &["docker-compose.yml".to_string(), "docker-compose*.yml".to_string()],
        );

        assert_eq!(
            files,
            vec![
                tmp.path().join("docker-compose.yml"),
                tmp.path().join("docker-compose.override.yml"),
            ]
        );
    }

    #[test]
    fn test_glob_files_skips_invalid_pattern() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("compose.yaml"), "").unwrap();

        let files = glob_files(
            tmp.path(),
            &["compose[.yaml".to_string(), "compose.yaml".to_string()],
        );

        assert_eq!(files, vec![tmp.path().join("compose.yaml")]);
    }
}
