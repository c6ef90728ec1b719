//! Global constants used throughout the aicm codebase.
//!
//! This module contains file names, format versions, and the numeric
//! parameters of the installation-time estimate. Defining them centrally
//! improves maintainability and makes magic numbers more discoverable.

/// File name of the installation manifest inside a target directory.
///
/// One manifest exists per target root and records every configuration
/// installed beneath it.
pub const MANIFEST_FILE_NAME: &str = "installation-manifest.json";

/// File name of the advisory lock taken while rewriting the manifest.
///
/// The lock file lives next to the manifest and is never deleted; holding
/// an exclusive OS lock on it serializes concurrent writers across
/// processes.
pub const MANIFEST_LOCK_FILE_NAME: &str = ".installation-manifest.lock";

/// Current on-disk format version of the installation manifest.
///
/// Manifests reporting a newer version than this are treated as
/// unreadable and the tracker starts from an empty state.
pub const MANIFEST_FORMAT_VERSION: u32 = 1;

/// Chunk size in bytes used when streaming files through the SHA-256
/// hasher.
///
/// Artifacts are hashed in fixed-size chunks so arbitrarily large files
/// never have to be resident in memory.
pub const CHECKSUM_CHUNK_SIZE: usize = 8192;

/// Prefix prepended to hex-encoded SHA-256 digests in stored checksums.
pub const CHECKSUM_PREFIX: &str = "sha256:";

/// Marker suffix that flags a dependency edge as optional.
pub const OPTIONAL_MARKER: &str = "@optional";

/// Floor for installation time estimates, in seconds.
pub const MIN_ESTIMATED_SECONDS: u64 = 10;

/// Per-step overhead assumed by the installation time estimate, in seconds.
pub const SECONDS_PER_STEP: u64 = 2;

/// Throughput assumed by the installation time estimate (1 MiB per second).
///
/// The estimate is a deliberately crude linear model:
/// `max(MIN_ESTIMATED_SECONDS, total_size / ESTIMATE_BYTES_PER_SECOND +
/// steps * SECONDS_PER_STEP)`.
pub const ESTIMATE_BYTES_PER_SECOND: u64 = 1024 * 1024;

/// Minimum Jaro-Winkler similarity for a catalog id to be offered as a
/// "did you mean" suggestion on a missing dependency.
pub const SUGGESTION_SIMILARITY_THRESHOLD: f64 = 0.8;
