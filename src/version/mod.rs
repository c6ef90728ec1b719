//! Version constraint parsing and comparison for catalog dependencies.
//!
//! Catalog versions are plain dotted strings, not semver: `"1.2"`,
//! `"2024.1.0"`, and `"beta"` are all legal. Comparison treats all-numeric
//! versions as zero-padded integer tuples and falls back to lexicographic
//! ordering for anything else, so constraints keep working for catalogs
//! that never adopted numeric versioning.
//!
//! # Module Organization
//!
//! - [`compare`] - the ordering primitive, [`compare_versions`]
//! - [`constraint`] - [`VersionConstraint`] parsing and evaluation
//!
//! # Example
//!
//! ```rust
//! use aicm::version::VersionConstraint;
//!
//! let constraint = VersionConstraint::parse(">=1.2.0");
//! assert!(constraint.matches("1.2"));
//! assert!(!constraint.matches("1.1.9"));
//! ```

pub mod compare;
pub mod constraint;

pub use compare::compare_versions;
pub use constraint::{ConstraintOp, VersionConstraint};
