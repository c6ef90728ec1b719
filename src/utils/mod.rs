//! Cross-platform utilities and helpers
//!
//! This module provides the small set of filesystem and platform helpers the
//! rest of the crate builds on. All utilities are designed to behave
//! consistently across Windows, macOS, and Linux.
//!
//! # Modules
//!
//! - [`fs`] - File system operations with atomic writes
//! - [`platform`] - Platform identification and well-known directories
//!
//! # Example
//!
//! ```rust,no_run
//! use aicm::utils::{atomic_write, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("output/contexts"))?;
//! atomic_write(Path::new("output/contexts/base.md"), b"# Base context")?;
//! # Ok(())
//! # }
//! ```

pub mod fs;
pub mod platform;

pub use fs::{atomic_write, ensure_dir, ensure_parent_dir, path_to_storage_string};
pub use platform::{current_platform, default_target_dir, get_home_dir, is_windows};
