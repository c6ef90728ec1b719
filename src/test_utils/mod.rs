//! Test utilities: logging setup and catalog fixtures.
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suites under `tests/`.

use std::fs;
use std::path::PathBuf;
use std::sync::Once;

use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::catalog::{Catalog, ConfigItem};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Initializes the tracing subscriber once regardless of how many times
/// it is called. Respects `RUST_LOG` when set; otherwise uses the
/// provided level, or stays silent when neither is given.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Builder-style [`ConfigItem`] helper for tests.
///
/// `path` is catalog-relative; dependency strings use the
/// `<id>[<op><version>][@optional]` grammar.
#[must_use]
pub fn config_item(id: &str, version: &str, path: &str, deps: &[&str]) -> ConfigItem {
    let mut item = ConfigItem::new(id, version, path);
    for dep in deps {
        item = item.with_dependency(*dep);
    }
    item
}

/// A temporary catalog tree plus target root for filesystem tests.
///
/// Source artifacts are materialized under `catalog/` inside the temp
/// dir; the target root starts empty and is created on demand by the
/// code under test.
pub struct CatalogFixture {
    temp: TempDir,
    pub catalog: Catalog,
}

impl CatalogFixture {
    /// Creates the fixture and writes one source artifact per item
    /// (content derived from the id, so checksums differ per item).
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = ConfigItem>) -> Self {
        let fixture = Self {
            temp: TempDir::new().expect("failed to create temp dir"),
            catalog: Catalog::from_items(items),
        };
        for item in fixture.catalog.items() {
            fixture.write_source(&item.file_path, &format!("content of {}\n", item.id));
        }
        fixture
    }

    #[must_use]
    pub fn catalog_root(&self) -> PathBuf {
        self.temp.path().join("catalog")
    }

    #[must_use]
    pub fn target_root(&self) -> PathBuf {
        self.temp.path().join("target")
    }

    /// Writes (or rewrites) a source artifact at a catalog-relative path.
    pub fn write_source(&self, relative: &str, content: &str) {
        let path = self.catalog_root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create source dir");
        }
        fs::write(&path, content).expect("failed to write source artifact");
    }

    /// Copies a source artifact into the target tree at the same
    /// relative path, simulating an executed install step. Returns the
    /// target path.
    pub fn install_artifact(&self, relative: &str) -> PathBuf {
        let source = self.catalog_root().join(relative);
        let target = self.target_root().join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).expect("failed to create target dir");
        }
        fs::copy(&source, &target).expect("failed to copy artifact");
        target
    }
}
