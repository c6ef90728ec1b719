//! Catalog records and the in-memory catalog index.
//!
//! A catalog is a map from stable configuration ids to [`ConfigItem`]
//! records. How the catalog gets produced (directory scans, frontmatter
//! extraction) is a concern of the tooling that generates it; this module
//! only consumes a prepared catalog, either built in memory or loaded from
//! a JSON document via [`Catalog::load`].
//!
//! # Example
//!
//! ```rust
//! use aicm::catalog::{Catalog, ConfigItem};
//!
//! let mut catalog = Catalog::new();
//! catalog.insert(
//!     ConfigItem::new("base-context", "1.0.0", "contexts/base.md")
//!         .with_name("Base Context")
//!         .with_dependency("common-defs>=0.2"),
//! );
//! assert!(catalog.contains("base-context"));
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::AicmError;

pub mod dependency;

pub use dependency::{DependencySpec, DependencyType};

/// Platform and tool-version restrictions of a catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    /// Operating systems the entry supports. Empty means unrestricted.
    /// Values are matched case-insensitively against
    /// [`crate::utils::platform::current_platform`] names.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub platforms: BTreeSet<String>,

    /// Constraint on the version of the tool consuming the configuration,
    /// in the same grammar as dependency constraints (`">=1.2"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,
}

impl Compatibility {
    /// True when no restriction is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty() && self.target_version.is_none()
    }

    /// Whether the entry supports the given platform. An empty platform set
    /// places no restriction.
    #[must_use]
    pub fn supports_platform(&self, platform: &str) -> bool {
        self.platforms.is_empty()
            || self
                .platforms
                .iter()
                .any(|p| p.eq_ignore_ascii_case(platform))
    }
}

/// One installable unit of the catalog: a context document, profile, hook,
/// or MCP-server definition.
///
/// Items are immutable once the catalog is built; the resolver and planner
/// only read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigItem {
    /// Stable identifier, unique within the catalog.
    pub id: String,

    /// Human-readable display name. Falls back to the id when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Version string of this item, compared with
    /// [`compare_versions`](crate::version::compare_versions) semantics.
    pub version: String,

    /// Raw dependency strings in the `<id>[<op><version>][@optional]`
    /// grammar, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Platform and tool-version restrictions.
    #[serde(default, skip_serializing_if = "Compatibility::is_empty")]
    pub compatibility: Compatibility,

    /// Catalog-relative path of the artifact, `/`-separated. The first
    /// segment decides the config type and the target subtree.
    pub file_path: String,
}

impl ConfigItem {
    /// Creates a new item with the given id, version, and catalog-relative
    /// file path.
    pub fn new(
        id: impl Into<String>,
        version: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            version: version.into(),
            dependencies: Vec::new(),
            compatibility: Compatibility::default(),
            file_path: file_path.into(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends one raw dependency string.
    #[must_use]
    pub fn with_dependency(mut self, spec: impl Into<String>) -> Self {
        self.dependencies.push(spec.into());
        self
    }

    /// Restricts the item to the given platforms.
    #[must_use]
    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compatibility.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    /// Constrains the tool version the item is compatible with.
    #[must_use]
    pub fn with_target_version(mut self, constraint: impl Into<String>) -> Self {
        self.compatibility.target_version = Some(constraint.into());
        self
    }

    /// Display name, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Config type derived from the first segment of [`file_path`], in
    /// singular form: `contexts/base.md` is a `context`. Unknown segments
    /// pass through verbatim.
    ///
    /// [`file_path`]: ConfigItem::file_path
    #[must_use]
    pub fn config_type(&self) -> &str {
        let first = self.file_path.split('/').next().unwrap_or("");
        match first {
            "contexts" => "context",
            "profiles" => "profile",
            "hooks" => "hook",
            "mcp-servers" => "mcp-server",
            other => other,
        }
    }

    /// Parses the raw dependency strings in declaration order.
    pub fn parsed_dependencies(&self) -> impl Iterator<Item = DependencySpec> + '_ {
        self.dependencies.iter().map(|raw| DependencySpec::parse(raw))
    }
}

/// On-disk shape of a catalog document.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    configurations: Vec<ConfigItem>,
}

/// The in-memory catalog index, keyed by configuration id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: HashMap<String, ConfigItem>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from items. Later duplicates of an id replace
    /// earlier ones.
    pub fn from_items(items: impl IntoIterator<Item = ConfigItem>) -> Self {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(item);
        }
        catalog
    }

    /// Loads a catalog from a prepared JSON document of the form
    /// `{"configurations": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns [`AicmError::CatalogNotFound`] when the path does not exist,
    /// and a parse error with context when the document is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AicmError::CatalogNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        let document: CatalogDocument = serde_json::from_str(&content)
            .with_context(|| format!("Invalid catalog JSON in {}", path.display()))?;

        tracing::debug!(
            count = document.configurations.len(),
            path = %path.display(),
            "loaded catalog"
        );

        Ok(Self::from_items(document.configurations))
    }

    /// Inserts an item, returning the previous item with the same id.
    pub fn insert(&mut self, item: ConfigItem) -> Option<ConfigItem> {
        self.items.insert(item.id.clone(), item)
    }

    /// Looks an item up by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ConfigItem> {
        self.items.get(id)
    }

    /// Whether an item with the given id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Iterates over all ids, in unspecified order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Iterates over all items, in unspecified order.
    pub fn items(&self) -> impl Iterator<Item = &ConfigItem> {
        self.items.values()
    }

    /// Number of items in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the catalog has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
