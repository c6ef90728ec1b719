//! Error handling for aicm
//!
//! The library distinguishes two kinds of failure:
//!
//! 1. **Expected conditions** — unresolvable dependencies, version
//!    mismatches, platform incompatibilities. These never surface as `Err`;
//!    they are reported through [`ConflictInfo`](crate::resolver::ConflictInfo)
//!    lists and validation tuples so partial results stay usable.
//! 2. **Actual failures** — a catalog file that cannot be read, a mutation
//!    against a configuration that is not installed, artifact I/O going
//!    wrong. These are represented by [`AicmError`] and propagated with
//!    [`anyhow`] context at the call sites that touch the filesystem.
//!
//! Standard library and serde errors convert automatically:
//! - [`std::io::Error`] → [`AicmError::Io`]
//! - [`serde_json::Error`] → [`AicmError::Json`]
//!
//! # Examples
//!
//! ```rust
//! use aicm::core::AicmError;
//!
//! let err = AicmError::ConfigNotInstalled { name: "base-context".into() };
//! assert_eq!(
//!     err.to_string(),
//!     "configuration 'base-context' is not installed"
//! );
//! ```

use thiserror::Error;

/// The error type for aicm operations.
///
/// Each variant represents a specific failure mode and carries the details
/// needed to act on it. Callers working through [`anyhow`] can recover the
/// typed value with `downcast_ref::<AicmError>()`.
#[derive(Error, Debug)]
pub enum AicmError {
    /// A catalog document was requested from a path that does not exist.
    #[error("catalog file not found: {path}")]
    CatalogNotFound {
        /// Path that was checked for the catalog document.
        path: String,
    },

    /// A tracker mutation referenced a configuration the manifest does not
    /// contain.
    #[error("configuration '{name}' is not installed")]
    ConfigNotInstalled {
        /// Id of the configuration that was expected to be installed.
        name: String,
    },

    /// IO error wrapper for standard library IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper for serialization and parsing failures.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
