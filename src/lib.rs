//! AICM - AI Configuration Manager
//!
//! A library for resolving, planning, and tracking the installation of
//! configuration packages (context documents, profiles, hooks, and
//! MCP-server definitions) from a prepared catalog into a user's target
//! directory tree.
//!
//! # Architecture Overview
//!
//! AICM splits an installation into three read-mostly phases plus one
//! durable record:
//! - A **catalog** of immutable configuration records is the input;
//!   each record declares its dependencies in a compact string grammar
//!   (`<id>[<op><version>][@optional]`).
//! - The **resolver** computes the transitive closure of requested ids,
//!   classifies every id as required or optional, and reports missing
//!   dependencies, cycles, version mismatches, and platform problems as
//!   structured conflicts instead of failing.
//! - The **planner** orders the resolved set dependencies-first, decides
//!   per configuration whether to install, update, or skip, maps catalog
//!   paths onto the target layout, and validates the environment at a
//!   configurable strictness.
//! - The **tracker** persists what is actually installed in a JSON
//!   manifest with checksums and an operation history, rewritten
//!   atomically under a cross-process lock.
//!
//! ## Key Properties
//!
//! - **Total resolution**: resolution and planning always run to
//!   completion; only a missing dependency marks a resolution as failed.
//! - **Deterministic ordering**: plans order dependencies before
//!   dependents; cycle members are still planned, after the acyclic part.
//! - **Durable state**: the manifest survives crashes (temp file plus
//!   rename) and concurrent writers (exclusive file lock), and a corrupt
//!   manifest degrades to empty instead of wedging the tool.
//!
//! # Core Modules
//!
//! - [`catalog`] - Configuration records, the catalog index, and the
//!   dependency-spec parser
//! - [`resolver`] - Dependency resolution, conflict detection, and
//!   dependency trees
//! - [`planner`] - Installation plan construction, validation, and
//!   preview
//! - [`tracker`] - Durable installed-state manifest with checksums and
//!   history
//!
//! ## Supporting Modules
//!
//! - [`core`] - Typed error taxonomy
//! - [`version`] - Version constraint parsing and comparison
//! - [`utils`] - Filesystem and platform helpers
//! - [`constants`] - Shared names and tuning knobs
//!
//! # Example
//!
//! ```rust
//! use aicm::catalog::{Catalog, ConfigItem};
//! use aicm::planner::{InstallationPlanner, ValidationLevel};
//! use aicm::resolver::DependencyResolver;
//! use aicm::tracker::InstallationTracker;
//! use std::path::Path;
//!
//! let catalog = Catalog::from_items([
//!     ConfigItem::new("python-dev", "1.0.0", "profiles/python-dev.json")
//!         .with_dependency("base-context>=1.0"),
//!     ConfigItem::new("base-context", "1.2.0", "contexts/base.md"),
//! ]);
//!
//! let resolver = DependencyResolver::new(&catalog);
//! let result = resolver.resolve_dependencies(&["python-dev".to_string()], None, None);
//! assert!(result.success);
//!
//! let tracker = InstallationTracker::load(Path::new("/tmp/aicm-example-target"));
//! let planner = InstallationPlanner::new(
//!     &catalog,
//!     &tracker,
//!     "/tmp/aicm-example-catalog",
//!     "/tmp/aicm-example-target",
//! );
//! let plan = planner.create_installation_plan(
//!     &["python-dev".to_string()],
//!     ValidationLevel::Basic,
//!     true,
//!     false,
//! );
//! assert_eq!(plan.steps[0].config_id, "base-context");
//! ```

// Core functionality modules
pub mod catalog;
pub mod core;
pub mod planner;
pub mod resolver;
pub mod tracker;

// Supporting modules
pub mod constants;
pub mod utils;
pub mod version;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
