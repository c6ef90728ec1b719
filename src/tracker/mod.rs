//! Durable tracking of installed configurations.
//!
//! The tracker is the single source of truth for what is installed under
//! one target root. State lives in a JSON manifest
//! (`installation-manifest.json`) that is loaded once, mutated in memory,
//! and rewritten in full on every change. Writes are atomic (temp file
//! plus rename) and guarded by an exclusive cross-process
//! [`ManifestLock`], so a crash mid-write can never leave a truncated
//! manifest behind.
//!
//! Alongside the per-configuration records the manifest keeps an
//! append-only history of operations (install, update, remove, rollback)
//! in chronological order; [`InstallationTracker::get_history`] serves it
//! newest first.
//!
//! # Example
//!
//! ```rust,no_run
//! use aicm::catalog::ConfigItem;
//! use aicm::tracker::{InstallationTracker, InstalledBy};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let target = Path::new("/home/user/.aicm");
//! let mut tracker = InstallationTracker::load(target);
//!
//! let item = ConfigItem::new("base-context", "1.2.0", "contexts/base.md");
//! tracker.record_installation(
//!     &item,
//!     Path::new("/catalog/contexts/base.md"),
//!     &target.join("contexts/base.md"),
//!     &[],
//!     InstalledBy::Manual,
//! )?;
//! assert!(tracker.is_installed("base-context"));
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::ConfigItem;
use crate::constants::{MANIFEST_FILE_NAME, MANIFEST_FORMAT_VERSION};
use crate::core::AicmError;
use crate::utils::{current_platform, path_to_storage_string};

pub mod checksum;
mod io;

pub use checksum::{compute_checksum, verify_checksum};
pub use io::ManifestLock;

/// How a configuration came to be installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstalledBy {
    /// Explicitly requested by the user.
    Manual,
    /// Pulled in as a dependency of something else.
    Dependency,
    /// Installed as part of a bundle.
    Bundle,
}

/// Health of an installed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallStatus {
    #[default]
    Installed,
    Outdated,
    Broken,
    PendingUpdate,
}

/// Kind of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Install,
    Update,
    Remove,
    Rollback,
}

/// Everything recorded about one installed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledConfigMetadata {
    pub config_id: String,
    pub name: String,
    pub version: String,
    /// Singular config type derived from the catalog file path
    /// (`context`, `profile`, `hook`, `mcp-server`).
    pub config_type: String,
    pub installation_date: DateTime<Utc>,
    /// Catalog-side origin of the artifact, `/`-separated.
    pub source_path: String,
    /// Where the artifact was installed, `/`-separated.
    pub target_path: String,
    /// Ids of the configurations this one depends on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    pub installed_by: InstalledBy,
    pub status: InstallStatus,
    /// `sha256:<hex>` of the installed artifact.
    pub checksum: String,
    /// Free-form extras (file size, catalog path, ...).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// One entry of the installation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationOperation {
    pub operation_id: String,
    #[serde(rename = "type")]
    pub operation_type: OperationType,
    pub timestamp: DateTime<Utc>,
    pub affected_configs: Vec<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// The persisted manifest document.
///
/// Field order mirrors the wire layout. `ai_configurator_version` is the
/// historical wire name for the version of the tool that wrote the file;
/// it is kept for interoperability with existing manifests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationManifest {
    /// Manifest format version, currently 1.
    pub version: u32,
    pub created_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(rename = "ai_configurator_version")]
    pub tool_version: String,
    pub platform: String,
    pub target_directory: String,
    #[serde(default)]
    pub configurations: BTreeMap<String, InstalledConfigMetadata>,
    /// Chronological operation log, oldest first.
    #[serde(default)]
    pub installation_history: Vec<InstallationOperation>,
}

impl InstallationManifest {
    /// Creates an empty manifest for a target root.
    #[must_use]
    pub fn new(target_directory: &Path) -> Self {
        let now = Utc::now();
        Self {
            version: MANIFEST_FORMAT_VERSION,
            created_date: now,
            last_updated: now,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            platform: current_platform().to_string(),
            target_directory: path_to_storage_string(target_directory),
            configurations: BTreeMap::new(),
            installation_history: Vec::new(),
        }
    }
}

/// Tracks installed configurations for one target root.
pub struct InstallationTracker {
    target_root: PathBuf,
    manifest_path: PathBuf,
    manifest: InstallationManifest,
}

impl InstallationTracker {
    /// Loads the tracker for a target root.
    ///
    /// A missing, corrupt, or newer-format manifest degrades to an empty
    /// one; loading never fails.
    #[must_use]
    pub fn load(target_root: &Path) -> Self {
        let manifest_path = target_root.join(MANIFEST_FILE_NAME);
        let manifest = io::load_manifest(&manifest_path)
            .unwrap_or_else(|| InstallationManifest::new(target_root));
        Self {
            target_root: target_root.to_path_buf(),
            manifest_path,
            manifest,
        }
    }

    /// Path of the manifest file, whether or not it exists yet.
    #[must_use]
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Read access to the full in-memory manifest.
    #[must_use]
    pub fn manifest(&self) -> &InstallationManifest {
        &self.manifest
    }

    #[must_use]
    pub fn is_installed(&self, id: &str) -> bool {
        self.manifest.configurations.contains_key(id)
    }

    #[must_use]
    pub fn get_installed_config(&self, id: &str) -> Option<&InstalledConfigMetadata> {
        self.manifest.configurations.get(id)
    }

    #[must_use]
    pub fn get_installed_version(&self, id: &str) -> Option<&str> {
        self.manifest
            .configurations
            .get(id)
            .map(|entry| entry.version.as_str())
    }

    /// All installed ids in sorted order.
    #[must_use]
    pub fn installed_ids(&self) -> Vec<String> {
        self.manifest.configurations.keys().cloned().collect()
    }

    /// Installed configurations that declare `id` as a dependency, in
    /// sorted order.
    #[must_use]
    pub fn get_dependents(&self, id: &str) -> Vec<String> {
        self.manifest
            .configurations
            .iter()
            .filter(|(_, entry)| entry.dependencies.iter().any(|dep| dep == id))
            .map(|(dependent, _)| dependent.clone())
            .collect()
    }

    /// Records a fresh installation of `item` and persists the manifest.
    ///
    /// The installed artifact at `target_path` is checksummed (streamed
    /// SHA-256) and its size captured in the metadata snapshot.
    ///
    /// # Errors
    ///
    /// Fails when the artifact cannot be read or the manifest cannot be
    /// written.
    pub fn record_installation(
        &mut self,
        item: &ConfigItem,
        source_path: &Path,
        target_path: &Path,
        dependencies: &[String],
        installed_by: InstalledBy,
    ) -> Result<()> {
        let checksum = compute_checksum(target_path)
            .with_context(|| format!("Failed to checksum installed artifact for '{}'", item.id))?;
        let file_size = fs::metadata(target_path)
            .with_context(|| format!("Failed to stat installed artifact for '{}'", item.id))?
            .len();

        let mut metadata = HashMap::new();
        metadata.insert("file_size".to_string(), serde_json::json!(file_size));
        metadata.insert("catalog_path".to_string(), serde_json::json!(item.file_path));

        let record = InstalledConfigMetadata {
            config_id: item.id.clone(),
            name: item.display_name().to_string(),
            version: item.version.clone(),
            config_type: item.config_type().to_string(),
            installation_date: Utc::now(),
            source_path: path_to_storage_string(source_path),
            target_path: path_to_storage_string(target_path),
            dependencies: dependencies.to_vec(),
            installed_by,
            status: InstallStatus::Installed,
            checksum,
            metadata,
        };

        tracing::debug!(config_id = %item.id, version = %item.version, "recording installation");
        self.manifest.configurations.insert(item.id.clone(), record);
        self.push_operation(OperationType::Install, vec![item.id.clone()]);
        self.persist()
    }

    /// Records an update of an installed configuration.
    ///
    /// When `new_checksum` is `None` the checksum is recomputed from the
    /// recorded target path.
    ///
    /// # Errors
    ///
    /// Returns [`AicmError::ConfigNotInstalled`] for unknown ids.
    pub fn record_update(
        &mut self,
        id: &str,
        new_version: &str,
        new_checksum: Option<String>,
    ) -> Result<()> {
        let Some(entry) = self.manifest.configurations.get_mut(id) else {
            return Err(AicmError::ConfigNotInstalled { name: id.to_string() }.into());
        };

        let checksum = match new_checksum {
            Some(checksum) => checksum,
            None => compute_checksum(Path::new(&entry.target_path))
                .with_context(|| format!("Failed to checksum updated artifact for '{id}'"))?,
        };

        entry.version = new_version.to_string();
        entry.checksum = checksum;
        entry.installation_date = Utc::now();
        entry.status = InstallStatus::Installed;

        tracing::debug!(config_id = id, version = new_version, "recording update");
        self.push_operation(OperationType::Update, vec![id.to_string()]);
        self.persist()
    }

    /// Records the removal of an installed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AicmError::ConfigNotInstalled`] for unknown ids.
    pub fn record_removal(&mut self, id: &str) -> Result<()> {
        if self.manifest.configurations.remove(id).is_none() {
            return Err(AicmError::ConfigNotInstalled { name: id.to_string() }.into());
        }

        tracing::debug!(config_id = id, "recording removal");
        self.push_operation(OperationType::Remove, vec![id.to_string()]);
        self.persist()
    }

    /// Records a rollback that removed the given configurations.
    ///
    /// Ids that are not installed are skipped; the single history entry
    /// lists only what was actually dropped.
    pub fn record_rollback(&mut self, ids: &[String]) -> Result<()> {
        let mut removed = Vec::new();
        for id in ids {
            if self.manifest.configurations.remove(id).is_some() {
                removed.push(id.clone());
            }
        }

        tracing::debug!(removed = removed.len(), "recording rollback");
        self.push_operation(OperationType::Rollback, removed);
        self.persist()
    }

    /// Whether the installed artifact still matches its recorded
    /// checksum. Untracked ids, missing files, and unreadable files all
    /// count as failed.
    #[must_use]
    pub fn check_integrity(&self, id: &str) -> bool {
        let Some(entry) = self.manifest.configurations.get(id) else {
            return false;
        };
        let path = Path::new(&entry.target_path);
        let intact = verify_checksum(path, &entry.checksum);
        if !intact {
            tracing::warn!(config_id = id, path = %path.display(), "integrity check failed");
        }
        intact
    }

    /// Drops records whose target artifact no longer exists on disk and
    /// returns the removed ids. Persists only when something changed, so
    /// repeat calls are idempotent.
    pub fn cleanup_broken_installations(&mut self) -> Result<Vec<String>> {
        let broken: Vec<String> = self
            .manifest
            .configurations
            .iter()
            .filter(|(_, entry)| !Path::new(&entry.target_path).exists())
            .map(|(id, _)| id.clone())
            .collect();

        if broken.is_empty() {
            return Ok(broken);
        }

        for id in &broken {
            self.manifest.configurations.remove(id);
        }
        tracing::debug!(removed = broken.len(), "cleaned up broken installations");
        self.persist()?;
        Ok(broken)
    }

    /// Operation history, newest first. Storage order stays
    /// chronological; this sorts a copy.
    #[must_use]
    pub fn get_history(&self, limit: Option<usize>) -> Vec<InstallationOperation> {
        let mut history = self.manifest.installation_history.clone();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            history.truncate(limit);
        }
        history
    }

    fn push_operation(&mut self, operation_type: OperationType, affected_configs: Vec<String>) {
        self.manifest.installation_history.push(InstallationOperation {
            operation_id: Uuid::new_v4().to_string(),
            operation_type,
            timestamp: Utc::now(),
            affected_configs,
            success: true,
            metadata: HashMap::new(),
        });
    }

    /// Rewrites the manifest under the cross-process lock.
    fn persist(&mut self) -> Result<()> {
        self.manifest.last_updated = Utc::now();
        let _lock = ManifestLock::acquire(&self.target_root)?;
        io::save_manifest(&self.manifest_path, &self.manifest)
    }
}
