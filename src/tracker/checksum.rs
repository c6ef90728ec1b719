//! Streamed SHA-256 checksums for installed artifacts.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::constants::{CHECKSUM_CHUNK_SIZE, CHECKSUM_PREFIX};
use crate::core::AicmError;

/// Computes the SHA-256 checksum of a file.
///
/// The file is read in fixed-size chunks so large artifacts never have
/// to fit in memory.
///
/// # Returns
///
/// The checksum as a hex string with `sha256:` prefix.
///
/// # Errors
///
/// Returns [`AicmError::Io`] when the file cannot be opened or read.
pub fn compute_checksum(path: &Path) -> Result<String, AicmError> {
    use sha2::{Digest, Sha256};

    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHECKSUM_CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    let hash = hasher.finalize();
    Ok(format!("{CHECKSUM_PREFIX}{}", hex::encode(hash)))
}

/// Whether the file at `path` currently hashes to `expected`.
///
/// Any read failure counts as a mismatch.
#[must_use]
pub fn verify_checksum(path: &Path, expected: &str) -> bool {
    match compute_checksum(path) {
        Ok(actual) => actual == expected,
        Err(_) => false,
    }
}
