//! Conflict diagnostics produced during dependency resolution.
//!
//! Conflicts are advisory records, not errors: resolution always runs to
//! completion and reports everything it found. Only missing dependencies
//! make a resolution fail.

use std::fmt;

use crate::catalog::{Catalog, ConfigItem};
use crate::constants::SUGGESTION_SIMILARITY_THRESHOLD;
use crate::version::VersionConstraint;

/// Category of a resolution conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictType {
    /// A required or optional dependency does not exist in the catalog.
    MissingDependency,
    /// A dependency chain loops back on itself.
    CircularDependency,
    /// An installed or catalog version does not satisfy a constraint.
    VersionMismatch,
    /// A configuration does not support the current platform.
    IncompatiblePlatform,
}

impl ConflictType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingDependency => "missing_dependency",
            Self::CircularDependency => "circular_dependency",
            Self::VersionMismatch => "version_mismatch",
            Self::IncompatiblePlatform => "incompatible_platform",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single conflict found while resolving dependencies.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictInfo {
    /// What kind of conflict this is.
    pub conflict_type: ConflictType,
    /// The configuration the conflict is about.
    pub config_id: String,
    /// The other configuration involved, if any (for example the
    /// dependent that declared a failing constraint).
    pub related_id: Option<String>,
    /// Human readable description.
    pub message: String,
    /// Suggested way to resolve the conflict.
    pub suggested_resolution: String,
}

impl ConflictInfo {
    /// Missing dependencies are the only conflicts that make a
    /// resolution fail.
    pub fn is_fatal(&self) -> bool {
        self.conflict_type == ConflictType::MissingDependency
    }

    pub(crate) fn missing_dependency(
        config_id: &str,
        required_by: Option<&str>,
        catalog: &Catalog,
    ) -> Self {
        let mut message = format!("Configuration '{config_id}' was not found in the catalog");
        if let Some(origin) = required_by {
            message.push_str(&format!(" (required by '{origin}')"));
        }
        let suggested_resolution = match closest_catalog_id(config_id, catalog) {
            Some(candidate) => format!("Did you mean '{candidate}'?"),
            None => "Check the configuration id or refresh the catalog".to_string(),
        };
        Self {
            conflict_type: ConflictType::MissingDependency,
            config_id: config_id.to_string(),
            related_id: required_by.map(str::to_string),
            message,
            suggested_resolution,
        }
    }

    /// A resolved configuration whose catalog artifact is absent on
    /// disk. Classified as a missing dependency so it blocks plan
    /// validation the same way.
    pub(crate) fn missing_source(config_id: &str, source_path: &std::path::Path) -> Self {
        Self {
            conflict_type: ConflictType::MissingDependency,
            config_id: config_id.to_string(),
            related_id: None,
            message: format!(
                "Source file for configuration '{config_id}' not found: {}",
                source_path.display()
            ),
            suggested_resolution: "Refresh the catalog or restore the missing file".to_string(),
        }
    }

    pub(crate) fn circular_dependency(cycle: &[String]) -> Self {
        let chain = cycle.join(" → ");
        let config_id = cycle.first().cloned().unwrap_or_default();
        // The second to last entry is the configuration that closes the
        // loop (the last entry repeats the first).
        let related_id = if cycle.len() >= 2 {
            cycle.get(cycle.len() - 2).cloned()
        } else {
            None
        };
        Self {
            conflict_type: ConflictType::CircularDependency,
            config_id,
            related_id,
            message: format!("Circular dependency detected: {chain}"),
            suggested_resolution: "Break the cycle by removing one of the dependencies"
                .to_string(),
        }
    }

    pub(crate) fn version_mismatch(
        target: &ConfigItem,
        constraint: &VersionConstraint,
        required_by: &str,
    ) -> Self {
        Self {
            conflict_type: ConflictType::VersionMismatch,
            config_id: target.id.clone(),
            related_id: Some(required_by.to_string()),
            message: format!(
                "Configuration '{}' is at version {} which does not satisfy '{}' required by '{}'",
                target.id, target.version, constraint, required_by
            ),
            suggested_resolution: format!(
                "Publish or select a version of '{}' matching {}",
                target.id, constraint
            ),
        }
    }

    pub(crate) fn target_version_mismatch(
        item: &ConfigItem,
        constraint: &VersionConstraint,
        actual: &str,
    ) -> Self {
        Self {
            conflict_type: ConflictType::VersionMismatch,
            config_id: item.id.clone(),
            related_id: None,
            message: format!(
                "Configuration '{}' requires tool version {} but the current version is {}",
                item.id, constraint, actual
            ),
            suggested_resolution: "Upgrade the tool or pick an older configuration version"
                .to_string(),
        }
    }

    pub(crate) fn incompatible_platform(item: &ConfigItem, platform: &str) -> Self {
        let supported: Vec<String> = item
            .compatibility
            .platforms
            .iter()
            .cloned()
            .collect();
        Self {
            conflict_type: ConflictType::IncompatiblePlatform,
            config_id: item.id.clone(),
            related_id: None,
            message: format!(
                "Configuration '{}' does not support platform '{}' (supports: {})",
                item.id,
                platform,
                supported.join(", ")
            ),
            suggested_resolution: "Install on a supported platform or drop this configuration"
                .to_string(),
        }
    }
}

impl fmt::Display for ConflictInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.conflict_type, self.message)
    }
}

/// Finds the catalog id most similar to `target`, if any clears the
/// similarity threshold. Ties break toward the lexicographically
/// smaller id so suggestions are deterministic.
fn closest_catalog_id<'a>(target: &str, catalog: &'a Catalog) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for id in catalog.ids() {
        let score = strsim::jaro_winkler(target, id);
        if score < SUGGESTION_SIMILARITY_THRESHOLD {
            continue;
        }
        match best {
            Some((best_id, best_score)) => {
                if score > best_score || (score == best_score && id < best_id) {
                    best = Some((id, score));
                }
            }
            None => best = Some((id, score)),
        }
    }
    best.map(|(id, _)| id)
}
