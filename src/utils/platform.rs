//! Platform identification and well-known directories
//!
//! Catalog entries can restrict themselves to specific operating systems
//! via `compatibility.platforms`. The platform names used for that check
//! are the values of [`std::env::consts::OS`] ("linux", "macos",
//! "windows", ...), compared case-insensitively.

use anyhow::Result;
use std::path::PathBuf;

/// Checks if the current platform is Windows.
///
/// This is a compile-time check, used for platform-specific help text in
/// error messages.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Returns the platform name recorded in manifests and matched against
/// catalog `compatibility.platforms` sets.
///
/// # Examples
///
/// ```rust
/// use aicm::utils::platform::current_platform;
///
/// let platform = current_platform();
/// assert!(!platform.is_empty());
/// ```
#[must_use]
pub const fn current_platform() -> &'static str {
    std::env::consts::OS
}

/// Gets the home directory path for the current user.
///
/// # Errors
///
/// Fails when the platform's home directory environment is not set.
///
/// # Platform Behavior
///
/// - **Windows**: Uses `%USERPROFILE%`
/// - **Unix/Linux/macOS**: Uses `$HOME`
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Returns the default target directory for configuration installs,
/// `~/.aicm`.
///
/// Callers that manage several target trees pass explicit roots instead;
/// this is the fallback a CLI front end offers when none is given.
///
/// # Errors
///
/// Fails when the home directory cannot be determined.
pub fn default_target_dir() -> Result<PathBuf> {
    Ok(get_home_dir()?.join(".aicm"))
}
