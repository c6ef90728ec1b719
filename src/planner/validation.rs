//! Environment probes used during plan validation.
//!
//! Probes return `Some(finding)` on failure and `None` when the check
//! passes. Probe I/O errors are folded into findings as well; validation
//! never aborts planning.

use std::path::Path;

/// Checks that files can be created under the target root with a
/// create-then-delete probe file.
///
/// When the target root does not exist yet the probe runs in its nearest
/// existing ancestor, which is where `create_dir_all` would have to
/// start.
pub(crate) fn probe_write_permission(target_root: &Path) -> Option<String> {
    let probe_dir = nearest_existing_ancestor(target_root);
    match tempfile::Builder::new()
        .prefix(".aicm-probe-")
        .tempfile_in(probe_dir)
    {
        // NamedTempFile removes itself on drop.
        Ok(_probe) => None,
        Err(error) => Some(format!(
            "No write permission in {}: {error}",
            probe_dir.display()
        )),
    }
}

/// Checks that the filesystem holding the target root has at least
/// `required` bytes available.
pub(crate) fn probe_disk_space(target_root: &Path, required: u64) -> Option<String> {
    let probe_dir = nearest_existing_ancestor(target_root);
    match fs4::available_space(probe_dir) {
        Ok(available) if available >= required => None,
        Ok(available) => Some(format!(
            "Insufficient disk space: {required} bytes required, {available} available"
        )),
        Err(error) => Some(format!(
            "Could not determine available disk space for {}: {error}",
            probe_dir.display()
        )),
    }
}

fn nearest_existing_ancestor(path: &Path) -> &Path {
    path.ancestors().find(|p| p.exists()).unwrap_or(path)
}
