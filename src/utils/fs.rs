//! File system utilities for cross-platform file operations
//!
//! Provides the atomic write primitive used for the installation manifest
//! plus small directory helpers. The write-then-rename strategy guarantees
//! readers never observe a partially written file, which matters because the
//! manifest is rewritten in full on every mutation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Ensures a directory exists, creating it and all parent directories if
/// necessary.
///
/// # Arguments
///
/// * `path` - The directory path to create
///
/// # Errors
///
/// Returns an error if the path exists but is not a directory, or if
/// creation fails.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).with_context(|| {
            let platform_help = if crate::utils::platform::is_windows() {
                "On Windows: check the path length is < 260 chars or that long path support is enabled"
            } else {
                "Check directory permissions and path validity"
            };

            format!(
                "Failed to create directory: {}\n\n{}",
                path.display(),
                platform_help
            )
        })?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!(
            "Path exists but is not a directory: {}",
            path.display()
        ));
    }
    Ok(())
}

/// Ensures that the parent directory of a file path exists.
///
/// Paths without a parent (root level files) succeed without doing anything.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    Ok(())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// The content is written to a `.tmp` sibling first, synced to disk, and
/// then renamed over the target path. Parent directories are created as
/// needed.
///
/// # Arguments
///
/// * `path` - The target file path
/// * `content` - The raw bytes to write
///
/// # Errors
///
/// Returns an error if any step of the write fails; in that case the target
/// file is left untouched.
///
/// # Examples
///
/// ```rust,no_run
/// use aicm::utils::fs::atomic_write;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// atomic_write(Path::new("settings/mcp.json"), b"{}")?;
/// # Ok(())
/// # }
/// ```
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    ensure_parent_dir(path)?;

    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all()
            .with_context(|| "Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Converts a path to the string form stored in the installation manifest.
///
/// Backslashes are rewritten to forward slashes so manifests written on
/// Windows stay comparable with ones written elsewhere.
#[must_use]
pub fn path_to_storage_string(path: &Path) -> String {
    let raw = path.to_string_lossy();
    if raw.contains('\\') {
        raw.replace('\\', "/")
    } else {
        raw.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b").join("c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Re-running on an existing directory is fine.
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn test_ensure_dir_rejects_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("occupied");
        fs::write(&file, "x").unwrap();
        let err = ensure_dir(&file).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_atomic_write_creates_parents_and_content() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("settings").join("mcp.json");
        atomic_write(&target, b"{\"servers\":{}}").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"{\"servers\":{}}");
        // No temp file is left behind.
        assert!(!target.with_extension("tmp").exists());
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("file.txt");
        atomic_write(&target, b"old").unwrap();
        atomic_write(&target, b"new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn test_path_to_storage_string_normalizes_separators() {
        let path = PathBuf::from(r"contexts\team\base.md");
        assert_eq!(path_to_storage_string(&path), "contexts/team/base.md");

        let already = PathBuf::from("contexts/base.md");
        assert_eq!(path_to_storage_string(&already), "contexts/base.md");
    }
}
