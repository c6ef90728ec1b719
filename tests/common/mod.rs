//! Common test utilities and fixtures for AICM integration tests
//!
//! This module consolidates the catalog layouts shared by the integration
//! suites so each test file can focus on the scenario under test.

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use aicm::catalog::ConfigItem;
use aicm::test_utils::{CatalogFixture, config_item};
use std::fs;
use std::path::Path;

/// A small catalog covering every configuration type, with a required
/// chain, an optional dependency, and a platform-restricted profile.
pub fn standard_items() -> Vec<ConfigItem> {
    vec![
        config_item("base-context", "1.2.0", "contexts/base.md", &[]),
        config_item("linter-hook", "0.9.0", "hooks/linter.json", &["base-context"]),
        config_item(
            "python-dev",
            "2.1.0",
            "profiles/python-dev.json",
            &["base-context>=1.0", "linter-hook", "docs-search@optional"],
        ),
        config_item("docs-search", "1.0.0", "mcp-servers/docs-search.json", &[]),
        config_item("rust-dev", "1.0.0", "profiles/rust-dev.json", &["base-context>=1.0"])
            .with_platforms(["linux", "macos"]),
    ]
}

/// Standard catalog with source files written under a temporary root.
pub fn standard_fixture() -> CatalogFixture {
    CatalogFixture::new(standard_items())
}

/// File assertion helpers
pub struct FileAssert;

impl FileAssert {
    /// Assert a file exists
    pub fn exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert a file does not exist
    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(
            !path.exists(),
            "Expected file to not exist: {}",
            path.display()
        );
    }

    /// Assert a file contains specific content
    pub fn contains(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
        assert!(
            content.contains(expected),
            "Expected file {} to contain '{}'\nActual content: {}",
            path.display(),
            expected,
            content
        );
    }
}
