//! Manifest persistence: degrading reads, atomic writes, and the
//! cross-process manifest lock.
//!
//! Loading never fails: a missing, unreadable, corrupt, or
//! newer-than-supported manifest file degrades to "start empty" with a
//! trace event, so a damaged manifest can always be rebuilt by the next
//! successful save.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;

use crate::constants::{MANIFEST_FORMAT_VERSION, MANIFEST_LOCK_FILE_NAME};
use crate::utils::{atomic_write, ensure_dir};

use super::InstallationManifest;

/// Reads a manifest from disk, or `None` when there is nothing usable.
pub(crate) fn load_manifest(path: &Path) -> Option<InstallationManifest> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no installation manifest, starting empty");
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed to read manifest, starting empty");
            return None;
        }
    };

    let manifest: InstallationManifest = match serde_json::from_str(&content) {
        Ok(manifest) => manifest,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "manifest is not valid JSON, starting empty");
            return None;
        }
    };

    if manifest.version > MANIFEST_FORMAT_VERSION {
        tracing::warn!(
            found = manifest.version,
            supported = MANIFEST_FORMAT_VERSION,
            "manifest format is newer than this build supports, starting empty"
        );
        return None;
    }

    Some(manifest)
}

/// Serializes and atomically writes the manifest.
///
/// # Errors
///
/// Returns an error when serialization or the write fails; the previous
/// manifest file is left intact in that case.
pub(crate) fn save_manifest(path: &Path, manifest: &InstallationManifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest)
        .context("Failed to serialize installation manifest")?;
    atomic_write(path, json.as_bytes())
        .with_context(|| format!("Failed to write installation manifest to {}", path.display()))
}

/// Exclusive cross-process lock over one target root's manifest.
///
/// The lock is held for the lifetime of the value and released on drop.
/// Within a process, tracker mutations are already serialized by
/// `&mut self`; this guards against a second process rewriting the same
/// manifest concurrently.
pub struct ManifestLock {
    _file: File,
    path: PathBuf,
}

impl ManifestLock {
    /// Acquires the lock for the given target root, blocking until the
    /// current holder releases it.
    ///
    /// # Errors
    ///
    /// Returns an error when the lock file cannot be created or locked.
    pub fn acquire(target_root: &Path) -> Result<Self> {
        ensure_dir(target_root)?;
        let path = target_root.join(MANIFEST_LOCK_FILE_NAME);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to open manifest lock file: {}", path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("Failed to lock manifest at {}", path.display()))?;

        Ok(Self { _file: file, path })
    }
}

impl Drop for ManifestLock {
    fn drop(&mut self) {
        // The lock is released when the file closes anyway; unlock
        // explicitly so failures are at least visible.
        #[allow(unstable_name_collisions)]
        if let Err(error) = self._file.unlock() {
            eprintln!("Warning: Failed to unlock {}: {}", self.path.display(), error);
        }
    }
}
