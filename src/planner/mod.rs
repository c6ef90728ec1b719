//! Installation planning on top of dependency resolution.
//!
//! The planner turns requested root ids into an ordered
//! [`InstallationPlan`]: one step per resolved configuration, dependencies
//! before dependents, each step labeled with the action an executor
//! should take (install, update, skip, remove) and annotated with
//! validation findings.
//!
//! Planning is read-only and infallible: environment problems show up as
//! findings and conflicts on the plan, never as errors. Whether the plan
//! is safe to execute is a separate question answered by
//! [`InstallationPlanner::validate_plan`].
//!
//! # Plan construction
//!
//! 1. Resolve the roots ([`DependencyResolver::resolve_dependencies`])
//!    with the planner's platform snapshot and tool version.
//! 2. Order all resolved ids dependencies-first.
//! 3. Decide the action per id against the target tree and the tracker's
//!    installed state.
//! 4. Map each catalog path onto the target layout (fixed first-segment
//!    table, sub-paths preserved).
//! 5. Run the probes permitted by the [`ValidationLevel`].
//! 6. Aggregate sizes and a coarse time estimate.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::catalog::{Catalog, ConfigItem};
use crate::constants::{ESTIMATE_BYTES_PER_SECOND, MIN_ESTIMATED_SECONDS, SECONDS_PER_STEP};
use crate::resolver::{ConflictInfo, ConflictType, DependencyResolver, ResolutionResult};
use crate::tracker::InstallationTracker;
use crate::utils::current_platform;

mod preview;
mod validation;

/// What the executor should do for one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallAction {
    /// No artifact at the target path yet.
    Install,
    /// Artifact exists but is stale, untracked, or a reinstall was forced.
    Update,
    /// Already installed at the catalog version.
    Skip,
    /// Rollback step.
    Remove,
}

impl InstallAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Update => "update",
            Self::Skip => "skip",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for InstallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How much environment checking a plan gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationLevel {
    /// Source existence and write permission only.
    Minimal,
    /// Minimal plus disk-space checks.
    #[default]
    Basic,
    /// Basic plus platform compatibility per step.
    Strict,
}

/// One planned action on one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallationStep {
    pub config_id: String,
    pub action: InstallAction,
    /// Artifact location in the catalog tree.
    pub source_path: PathBuf,
    /// Mapped location under the target root.
    pub target_path: PathBuf,
    /// Size of the source artifact in bytes (0 when unreadable).
    pub file_size: u64,
    /// Resolved dependency ids of this configuration.
    pub dependencies: Vec<String>,
    pub is_optional: bool,
    /// Validation findings for this step.
    pub conflicts: Vec<String>,
}

/// An ordered set of installation steps plus plan-wide diagnostics.
#[derive(Debug, Clone)]
pub struct InstallationPlan {
    /// Steps in execution order, dependencies first.
    pub steps: Vec<InstallationStep>,
    pub total_configs: usize,
    /// Sum of all step sizes in bytes.
    pub total_size: u64,
    /// Coarse linear estimate of execution time.
    pub estimated_seconds: u64,
    /// Resolution conflicts plus mirrored missing-source findings.
    pub conflicts: Vec<ConflictInfo>,
    /// Platform the plan was computed for.
    pub platform: String,
    pub validation_level: ValidationLevel,
    pub dry_run: bool,
}

/// Builds installation and rollback plans from a catalog and the
/// tracker's installed state.
pub struct InstallationPlanner<'a> {
    catalog: &'a Catalog,
    tracker: &'a InstallationTracker,
    catalog_root: PathBuf,
    target_root: PathBuf,
    platform: String,
    tool_version: Option<String>,
}

impl<'a> InstallationPlanner<'a> {
    /// Creates a planner for artifacts under `catalog_root` installing
    /// into `target_root`. The platform snapshot defaults to the current
    /// platform.
    pub fn new(
        catalog: &'a Catalog,
        tracker: &'a InstallationTracker,
        catalog_root: impl Into<PathBuf>,
        target_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            tracker,
            catalog_root: catalog_root.into(),
            target_root: target_root.into(),
            platform: current_platform().to_string(),
            tool_version: None,
        }
    }

    /// Overrides the platform snapshot.
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Sets the tool version items' `target_version` constraints are
    /// checked against.
    #[must_use]
    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = Some(version.into());
        self
    }

    /// Computes an installation plan for the given roots.
    pub fn create_installation_plan(
        &self,
        root_ids: &[String],
        validation_level: ValidationLevel,
        dry_run: bool,
        force_reinstall: bool,
    ) -> InstallationPlan {
        let resolver = DependencyResolver::new(self.catalog);
        let result = resolver.resolve_dependencies(
            root_ids,
            Some(&self.platform),
            self.tool_version.as_deref(),
        );

        let mut ids = result.all_ids();
        ids.sort();
        let ordered = resolver.suggest_resolution_order(&ids);
        let members: HashSet<&str> = ids.iter().map(String::as_str).collect();

        let mut conflicts = result.conflicts.clone();
        let mut steps = Vec::with_capacity(ordered.len());
        for id in &ordered {
            if let Some(item) = self.catalog.get(id) {
                steps.push(self.build_step(
                    item,
                    &result,
                    &members,
                    validation_level,
                    force_reinstall,
                    &mut conflicts,
                ));
            }
        }

        let total_size: u64 = steps.iter().map(|step| step.file_size).sum();
        let estimated_seconds = estimate_seconds(total_size, steps.len());

        tracing::debug!(
            steps = steps.len(),
            total_size,
            conflicts = conflicts.len(),
            "installation plan created"
        );

        InstallationPlan {
            total_configs: steps.len(),
            steps,
            total_size,
            estimated_seconds,
            conflicts,
            platform: self.platform.clone(),
            validation_level,
            dry_run,
        }
    }

    /// Computes a removal plan for installed ids: the same steps with
    /// [`InstallAction::Remove`], ordered dependents before dependencies.
    ///
    /// Removing something an installed configuration outside the set
    /// still depends on yields a warning finding on that step.
    pub fn get_rollback_plan(&self, installed_ids: &[String]) -> InstallationPlan {
        let resolver = DependencyResolver::new(self.catalog);
        let mut order = resolver.suggest_resolution_order(installed_ids);
        order.reverse();

        let removal_set: HashSet<&str> = order.iter().map(String::as_str).collect();
        let mut steps = Vec::with_capacity(order.len());
        for id in &order {
            let mut findings = Vec::new();
            for dependent in self.tracker.get_dependents(id) {
                if !removal_set.contains(dependent.as_str()) {
                    findings.push(format!(
                        "Installed configuration '{dependent}' depends on '{id}' and is not part of this rollback"
                    ));
                }
            }

            let step = match self.tracker.get_installed_config(id) {
                Some(entry) => {
                    let target_path = PathBuf::from(&entry.target_path);
                    let file_size = fs::metadata(&target_path).map(|m| m.len()).unwrap_or(0);
                    InstallationStep {
                        config_id: id.clone(),
                        action: InstallAction::Remove,
                        source_path: PathBuf::from(&entry.source_path),
                        target_path,
                        file_size,
                        dependencies: entry.dependencies.clone(),
                        is_optional: false,
                        conflicts: findings,
                    }
                }
                None => {
                    // Not tracked: fall back to the catalog mapping so the
                    // executor still knows which path to clear.
                    let (source_path, target_path) = match self.catalog.get(id) {
                        Some(item) => (
                            self.catalog_root.join(&item.file_path),
                            self.map_target_path(&item.file_path),
                        ),
                        None => (PathBuf::new(), PathBuf::new()),
                    };
                    findings.push(format!("'{id}' is not tracked as installed"));
                    let file_size = fs::metadata(&target_path).map(|m| m.len()).unwrap_or(0);
                    InstallationStep {
                        config_id: id.clone(),
                        action: InstallAction::Remove,
                        source_path,
                        target_path,
                        file_size,
                        dependencies: Vec::new(),
                        is_optional: false,
                        conflicts: findings,
                    }
                }
            };
            steps.push(step);
        }

        let total_size: u64 = steps.iter().map(|step| step.file_size).sum();
        let estimated_seconds = estimate_seconds(total_size, steps.len());

        InstallationPlan {
            total_configs: steps.len(),
            steps,
            total_size,
            estimated_seconds,
            conflicts: Vec::new(),
            platform: self.platform.clone(),
            validation_level: ValidationLevel::Minimal,
            dry_run: false,
        }
    }

    /// Decides whether a plan may be executed.
    ///
    /// Only missing-dependency and circular-dependency class conflicts
    /// invalidate a plan. Disk-space, permission, version, and platform
    /// findings are returned as messages but do not block execution.
    pub fn validate_plan(&self, plan: &InstallationPlan) -> (bool, Vec<String>) {
        let mut messages = Vec::new();
        let mut is_valid = true;

        for conflict in &plan.conflicts {
            if matches!(
                conflict.conflict_type,
                ConflictType::MissingDependency | ConflictType::CircularDependency
            ) {
                is_valid = false;
            }
            messages.push(conflict.to_string());
        }

        for step in &plan.steps {
            for finding in &step.conflicts {
                messages.push(format!("{}: {finding}", step.config_id));
            }
        }

        (is_valid, messages)
    }

    /// Maps a catalog-relative file path onto the target tree.
    ///
    /// The first path segment selects the target subtree (`contexts`,
    /// `profiles`, and `hooks` map onto themselves, `mcp-servers` onto
    /// `settings`); unknown segments pass through unchanged. The sub-path
    /// beneath the first segment is preserved verbatim.
    #[must_use]
    pub fn map_target_path(&self, file_path: &str) -> PathBuf {
        let (first, rest) = match file_path.split_once('/') {
            Some((first, rest)) => (first, Some(rest)),
            None => (file_path, None),
        };

        let mapped = match first {
            "contexts" => "contexts",
            "profiles" => "profiles",
            "hooks" => "hooks",
            "mcp-servers" => "settings",
            _ => return self.target_root.join(file_path),
        };

        match rest {
            Some(rest) => self.target_root.join(mapped).join(rest),
            None => self.target_root.join(mapped),
        }
    }

    fn build_step(
        &self,
        item: &ConfigItem,
        result: &ResolutionResult,
        members: &HashSet<&str>,
        validation_level: ValidationLevel,
        force_reinstall: bool,
        global_conflicts: &mut Vec<ConflictInfo>,
    ) -> InstallationStep {
        let source_path = self.catalog_root.join(&item.file_path);
        let target_path = self.map_target_path(&item.file_path);
        let file_size = fs::metadata(&source_path).map(|m| m.len()).unwrap_or(0);

        let action = if !target_path.exists() {
            InstallAction::Install
        } else if force_reinstall {
            InstallAction::Update
        } else {
            match self.tracker.get_installed_version(&item.id) {
                Some(installed) if installed == item.version => InstallAction::Skip,
                // Version drift, or an artifact that exists on disk but
                // was never tracked.
                _ => InstallAction::Update,
            }
        };

        let dependencies: Vec<String> = item
            .parsed_dependencies()
            .filter(|spec| members.contains(spec.config_id.as_str()))
            .map(|spec| spec.config_id)
            .collect();

        let mut findings = Vec::new();
        if !source_path.exists() {
            findings.push(format!("Source file not found: {}", source_path.display()));
            global_conflicts.push(ConflictInfo::missing_source(&item.id, &source_path));
        }
        if let Some(finding) = validation::probe_write_permission(&self.target_root) {
            findings.push(finding);
        }
        if matches!(validation_level, ValidationLevel::Basic | ValidationLevel::Strict) {
            if let Some(finding) = validation::probe_disk_space(&self.target_root, file_size) {
                findings.push(finding);
            }
        }
        if validation_level == ValidationLevel::Strict
            && !item.compatibility.supports_platform(&self.platform)
        {
            findings.push(format!(
                "Configuration '{}' does not support platform '{}'",
                item.id, self.platform
            ));
        }

        InstallationStep {
            config_id: item.id.clone(),
            action,
            source_path,
            target_path,
            file_size,
            dependencies,
            is_optional: result.is_optional(&item.id),
            conflicts: findings,
        }
    }
}

/// Crude linear time model: one second per MiB plus a fixed cost per
/// step, with a floor.
fn estimate_seconds(total_size: u64, step_count: usize) -> u64 {
    let estimate = total_size / ESTIMATE_BYTES_PER_SECOND + step_count as u64 * SECONDS_PER_STEP;
    estimate.max(MIN_ESTIMATED_SECONDS)
}
