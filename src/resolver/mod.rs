//! Dependency resolution and conflict detection.
//!
//! This module turns requested root ids into the full set of catalog
//! configurations an installation needs, along with every problem found
//! on the way. Resolution never aborts early: the caller always gets a
//! complete [`ResolutionResult`] describing what resolved, what is
//! optional, and which conflicts exist.
//!
//! # Resolution Process
//!
//! Resolution runs in two passes:
//!
//! 1. **Closure pass**: a breadth-first walk over the dependency graph
//!    from the roots, driven by a work queue. Each id is expanded at most
//!    once per call. Missing ids become [`ConflictType::MissingDependency`]
//!    conflicts and are not descended into. Platform and tool-version
//!    incompatibilities are reported but do not remove the item. Edges
//!    whose version constraint is not satisfied by the target's catalog
//!    version are reported as [`ConflictType::VersionMismatch`] and not
//!    followed.
//! 2. **Cycle pass**: the declared edges between resolved members are
//!    replayed into a [`DependencyGraph`] and every cycle becomes a
//!    [`ConflictType::CircularDependency`] conflict.
//!
//! Every id is classified by the strongest edge type that reaches it
//! anywhere in the graph: one required edge makes an id required even if
//! ten optional edges also point at it. Classification is therefore
//! independent of traversal order.
//!
//! Only missing dependencies are fatal. Cycles, version mismatches, and
//! platform diagnostics leave [`ResolutionResult::success`] true.
//!
//! # Example
//!
//! ```rust
//! use aicm::catalog::{Catalog, ConfigItem};
//! use aicm::resolver::DependencyResolver;
//!
//! let catalog = Catalog::from_items([
//!     ConfigItem::new("app", "1.0.0", "profiles/app.json").with_dependency("base"),
//!     ConfigItem::new("base", "2.1.0", "contexts/base.md"),
//! ]);
//!
//! let resolver = DependencyResolver::new(&catalog);
//! let result = resolver.resolve_dependencies(&["app".to_string()], None, None);
//! assert!(result.success);
//! assert_eq!(result.resolved_ids, vec!["app", "base"]);
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use crate::catalog::{Catalog, DependencyType};
use crate::version::VersionConstraint;

mod conflict;
mod graph;
mod tree;

pub use conflict::{ConflictInfo, ConflictType};
pub use tree::DependencyTreeNode;

use graph::DependencyGraph;

/// Outcome of one resolution call.
///
/// `resolved_ids` and `optional_ids` are disjoint and hold only ids that
/// exist in the catalog, in the order the walk first reached them.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// Ids reached through at least one required edge (roots included).
    pub resolved_ids: Vec<String>,
    /// Ids reached through optional edges only.
    pub optional_ids: Vec<String>,
    /// Everything that went wrong, in discovery order.
    pub conflicts: Vec<ConflictInfo>,
    /// False only when a missing dependency was found.
    pub success: bool,
}

impl ResolutionResult {
    /// Required and optional ids together, required first.
    #[must_use]
    pub fn all_ids(&self) -> Vec<String> {
        let mut ids = self.resolved_ids.clone();
        ids.extend(self.optional_ids.iter().cloned());
        ids
    }

    /// Whether the id resolved as optional.
    #[must_use]
    pub fn is_optional(&self, id: &str) -> bool {
        self.optional_ids.iter().any(|i| i == id)
    }

    #[must_use]
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Queue entry of the closure pass: an id plus the edge that reached it.
struct WorkItem {
    id: String,
    edge: DependencyType,
    required_by: Option<String>,
}

/// Resolves requested configuration ids against a catalog.
pub struct DependencyResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> DependencyResolver<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Computes the transitive closure of `root_ids` and classifies every
    /// reached id as required or optional.
    ///
    /// `platform` and `target_version` are optional context: when given,
    /// each resolved item is additionally checked against its declared
    /// platform set and tool-version constraint, producing non-fatal
    /// conflicts on mismatch.
    pub fn resolve_dependencies(
        &self,
        root_ids: &[String],
        platform: Option<&str>,
        target_version: Option<&str>,
    ) -> ResolutionResult {
        let mut classification: HashMap<String, DependencyType> = HashMap::new();
        let mut visit_order: Vec<String> = Vec::new();
        let mut conflicts: Vec<ConflictInfo> = Vec::new();
        let mut missing_reported: HashSet<String> = HashSet::new();

        let mut queue: VecDeque<WorkItem> = root_ids
            .iter()
            .map(|id| WorkItem {
                id: id.clone(),
                edge: DependencyType::Required,
                required_by: None,
            })
            .collect();

        while let Some(work) = queue.pop_front() {
            if let Some(current) = classification.get_mut(&work.id) {
                // Strongest edge wins; an already expanded id is not
                // walked again.
                if *current == DependencyType::Optional && work.edge == DependencyType::Required {
                    *current = DependencyType::Required;
                }
                continue;
            }

            let Some(item) = self.catalog.get(&work.id) else {
                if missing_reported.insert(work.id.clone()) {
                    conflicts.push(ConflictInfo::missing_dependency(
                        &work.id,
                        work.required_by.as_deref(),
                        self.catalog,
                    ));
                }
                continue;
            };

            classification.insert(work.id.clone(), work.edge);
            visit_order.push(work.id.clone());

            if let Some(platform) = platform {
                if !item.compatibility.supports_platform(platform) {
                    conflicts.push(ConflictInfo::incompatible_platform(item, platform));
                }
            }
            if let (Some(actual), Some(raw)) =
                (target_version, item.compatibility.target_version.as_deref())
            {
                let constraint = VersionConstraint::parse(raw);
                if !constraint.matches(actual) {
                    conflicts.push(ConflictInfo::target_version_mismatch(item, &constraint, actual));
                }
            }

            for spec in item.parsed_dependencies() {
                if let Some(constraint) = &spec.version_constraint {
                    if let Some(target) = self.catalog.get(&spec.config_id) {
                        if !constraint.matches(&target.version) {
                            conflicts.push(ConflictInfo::version_mismatch(
                                target, constraint, &item.id,
                            ));
                            // Unsatisfied constraint: the edge is not
                            // followed. A missing target falls through to
                            // the queue and is reported as missing instead.
                            continue;
                        }
                    }
                }
                queue.push_back(WorkItem {
                    id: spec.config_id,
                    edge: spec.dependency_type,
                    required_by: Some(item.id.clone()),
                });
            }
        }

        // Cycle pass: replay declared edges between resolved members.
        let mut graph = DependencyGraph::new();
        for id in &visit_order {
            graph.ensure_node(id);
        }
        for id in &visit_order {
            if let Some(item) = self.catalog.get(id) {
                for spec in item.parsed_dependencies() {
                    if classification.contains_key(&spec.config_id) {
                        graph.add_edge(id, &spec.config_id);
                    }
                }
            }
        }
        for cycle in graph.find_cycles() {
            conflicts.push(ConflictInfo::circular_dependency(&cycle));
        }

        let success = !conflicts.iter().any(ConflictInfo::is_fatal);
        let mut resolved_ids = Vec::new();
        let mut optional_ids = Vec::new();
        for id in visit_order {
            match classification.get(&id) {
                Some(DependencyType::Optional) => optional_ids.push(id),
                _ => resolved_ids.push(id),
            }
        }

        tracing::debug!(
            resolved = resolved_ids.len(),
            optional = optional_ids.len(),
            conflicts = conflicts.len(),
            success,
            "dependency resolution finished"
        );

        ResolutionResult {
            resolved_ids,
            optional_ids,
            conflicts,
            success,
        }
    }

    /// Orders `ids` so that dependencies come before their dependents,
    /// considering only edges between members of `ids`.
    ///
    /// Cycle members that never become orderable are appended at the end.
    /// The order is stable with respect to dependency-before-dependent
    /// only; ties follow the input order.
    #[must_use]
    pub fn suggest_resolution_order(&self, ids: &[String]) -> Vec<String> {
        let members: HashSet<&str> = ids.iter().map(String::as_str).collect();

        let mut graph = DependencyGraph::new();
        for id in ids {
            graph.ensure_node(id);
        }
        for id in ids {
            if let Some(item) = self.catalog.get(id) {
                for spec in item.parsed_dependencies() {
                    if members.contains(spec.config_id.as_str()) {
                        graph.add_edge(id, &spec.config_id);
                    }
                }
            }
        }

        graph.topological_order()
    }

    /// Builds the full declared dependency tree of one configuration for
    /// display purposes. See [`DependencyTreeNode`].
    #[must_use]
    pub fn get_dependency_tree(&self, config_id: &str) -> DependencyTreeNode {
        DependencyTreeNode::build(self.catalog, config_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ConfigItem;

    fn item(id: &str, version: &str, deps: &[&str]) -> ConfigItem {
        let mut item = ConfigItem::new(id, version, format!("contexts/{id}.md"));
        for dep in deps {
            item = item.with_dependency(*dep);
        }
        item
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_resolves_simple_chain() {
        let catalog = Catalog::from_items([item("a", "1.0", &["b"]), item("b", "1.0", &[])]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["a"]), None, None);
        assert!(result.success);
        assert!(result.conflicts.is_empty());
        assert_eq!(result.resolved_ids, vec!["a", "b"]);
        assert!(result.optional_ids.is_empty());

        let order = resolver.suggest_resolution_order(&result.all_ids());
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_optional_edges_classify_separately() {
        let catalog = Catalog::from_items([
            item("root", "1.0", &["extras@optional", "core"]),
            item("extras", "1.0", &[]),
            item("core", "1.0", &[]),
        ]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["root"]), None, None);
        assert!(result.success);
        assert_eq!(result.resolved_ids, vec!["root", "core"]);
        assert_eq!(result.optional_ids, vec!["extras"]);
        assert!(result.is_optional("extras"));
        assert!(!result.is_optional("core"));
    }

    #[test]
    fn test_required_edge_promotes_optional_id() {
        // `shared` is reached optionally first, then required through b.
        let catalog = Catalog::from_items([
            item("root", "1.0", &["shared@optional", "b"]),
            item("b", "1.0", &["shared"]),
            item("shared", "1.0", &["inner"]),
            item("inner", "1.0", &[]),
        ]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["root"]), None, None);
        assert!(result.optional_ids.is_empty());
        assert!(result.resolved_ids.contains(&"shared".to_string()));
        // The originally optional expansion still walked shared's own deps.
        assert!(result.resolved_ids.contains(&"inner".to_string()));
    }

    #[test]
    fn test_missing_dependency_is_fatal() {
        let catalog = Catalog::from_items([item("a", "1.0", &["ghost"])]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["a"]), None, None);
        assert!(!result.success);
        assert_eq!(result.resolved_ids, vec!["a"]);
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].conflict_type, ConflictType::MissingDependency);
        assert_eq!(result.conflicts[0].related_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_missing_root_reported_without_origin() {
        let catalog = Catalog::new();
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["nope"]), None, None);
        assert!(!result.success);
        assert!(result.resolved_ids.is_empty());
        assert!(result.conflicts[0].related_id.is_none());
    }

    #[test]
    fn test_missing_id_reported_once() {
        let catalog = Catalog::from_items([
            item("a", "1.0", &["ghost"]),
            item("b", "1.0", &["ghost"]),
        ]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["a", "b"]), None, None);
        let missing: Vec<_> = result
            .conflicts
            .iter()
            .filter(|c| c.conflict_type == ConflictType::MissingDependency)
            .collect();
        assert_eq!(missing.len(), 1);
    }

    #[test]
    fn test_unsatisfied_constraint_blocks_edge() {
        let catalog = Catalog::from_items([
            item("app", "1.0", &["lib>=2.0"]),
            item("lib", "1.5", &[]),
        ]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["app"]), None, None);
        // Version mismatches are diagnostics, not failures.
        assert!(result.success);
        assert_eq!(result.resolved_ids, vec!["app"]);
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].conflict_type, ConflictType::VersionMismatch);
        assert_eq!(result.conflicts[0].config_id, "lib");
        assert_eq!(result.conflicts[0].related_id.as_deref(), Some("app"));
    }

    #[test]
    fn test_satisfied_constraint_follows_edge() {
        let catalog = Catalog::from_items([
            item("app", "1.0", &["lib>=2.0"]),
            item("lib", "2.0", &[]),
        ]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["app"]), None, None);
        assert!(result.conflicts.is_empty());
        assert_eq!(result.resolved_ids, vec!["app", "lib"]);
    }

    #[test]
    fn test_constraint_on_missing_target_reports_missing() {
        let catalog = Catalog::from_items([item("app", "1.0", &["ghost>=1.0"])]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["app"]), None, None);
        assert!(!result.success);
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].conflict_type, ConflictType::MissingDependency);
    }

    #[test]
    fn test_cycle_reported_but_not_fatal() {
        let catalog = Catalog::from_items([
            item("a", "1.0", &["b"]),
            item("b", "1.0", &["a"]),
        ]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["a"]), None, None);
        assert!(result.success);
        assert_eq!(result.resolved_ids, vec!["a", "b"]);
        assert_eq!(result.conflicts.len(), 1);
        let conflict = &result.conflicts[0];
        assert_eq!(conflict.conflict_type, ConflictType::CircularDependency);
        assert_eq!(conflict.message, "Circular dependency detected: a → b → a");
    }

    #[test]
    fn test_self_dependency_cycle() {
        let catalog = Catalog::from_items([item("loop", "1.0", &["loop"])]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["loop"]), None, None);
        assert!(result.success);
        assert_eq!(
            result.conflicts[0].message,
            "Circular dependency detected: loop → loop"
        );
    }

    #[test]
    fn test_platform_conflict_is_non_fatal() {
        let catalog = Catalog::from_items([
            item("tool", "1.0", &[]).with_platforms(["linux", "macos"]),
        ]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["tool"]), Some("windows"), None);
        assert!(result.success);
        assert_eq!(result.resolved_ids, vec!["tool"]);
        assert_eq!(
            result.conflicts[0].conflict_type,
            ConflictType::IncompatiblePlatform
        );
    }

    #[test]
    fn test_platform_check_skipped_without_context() {
        let catalog = Catalog::from_items([
            item("tool", "1.0", &[]).with_platforms(["linux"]),
        ]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["tool"]), None, None);
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn test_target_version_incompatibility() {
        let catalog = Catalog::from_items([
            item("modern", "1.0", &[]).with_target_version(">=2.0"),
        ]);
        let resolver = DependencyResolver::new(&catalog);

        let incompatible = resolver.resolve_dependencies(&ids(&["modern"]), None, Some("1.4"));
        assert!(incompatible.success);
        assert_eq!(
            incompatible.conflicts[0].conflict_type,
            ConflictType::VersionMismatch
        );

        let compatible = resolver.resolve_dependencies(&ids(&["modern"]), None, Some("2.0"));
        assert!(compatible.conflicts.is_empty());
    }

    #[test]
    fn test_shared_dependency_visited_once() {
        let catalog = Catalog::from_items([
            item("a", "1.0", &["shared"]),
            item("b", "1.0", &["shared"]),
            item("shared", "1.0", &[]),
        ]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["a", "b"]), None, None);
        assert_eq!(result.resolved_ids, vec!["a", "b", "shared"]);
    }

    #[test]
    fn test_duplicate_roots_resolve_once() {
        let catalog = Catalog::from_items([item("a", "1.0", &[])]);
        let resolver = DependencyResolver::new(&catalog);

        let result = resolver.resolve_dependencies(&ids(&["a", "a"]), None, None);
        assert_eq!(result.resolved_ids, vec!["a"]);
    }

    #[test]
    fn test_resolution_order_ignores_outside_edges() {
        // b depends on "external" which is not part of the ordered set.
        let catalog = Catalog::from_items([
            item("a", "1.0", &["b"]),
            item("b", "1.0", &["external"]),
            item("external", "1.0", &[]),
        ]);
        let resolver = DependencyResolver::new(&catalog);

        let order = resolver.suggest_resolution_order(&ids(&["a", "b"]));
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_resolution_order_appends_cycle_members() {
        let catalog = Catalog::from_items([
            item("solo", "1.0", &[]),
            item("a", "1.0", &["b"]),
            item("b", "1.0", &["a"]),
        ]);
        let resolver = DependencyResolver::new(&catalog);

        let order = resolver.suggest_resolution_order(&ids(&["solo", "a", "b"]));
        assert_eq!(order[0], "solo");
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_dependency_tree_delegates() {
        let catalog = Catalog::from_items([item("a", "1.0", &["b"]), item("b", "2.0", &[])]);
        let resolver = DependencyResolver::new(&catalog);

        let tree = resolver.get_dependency_tree("a");
        assert_eq!(tree.config_id, "a");
        assert_eq!(tree.dependencies[0].version, "2.0");
    }
}
