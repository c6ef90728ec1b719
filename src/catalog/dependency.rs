//! Dependency string parsing.
//!
//! Catalog entries declare dependencies as raw strings in the grammar
//! `<id>[<op><version>][@optional]` with op one of `>=`, `>`, `<=`, `<`,
//! `==`, `!=`. Parsing is deliberately permissive: ids are not validated,
//! and a string that fails the grammar entirely is treated as a bare id so
//! a single malformed entry degrades to a missing-dependency diagnostic
//! instead of aborting resolution.

use regex::Regex;

use crate::constants::OPTIONAL_MARKER;
use crate::version::VersionConstraint;

/// Whether a dependency edge is required for the dependent to function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyType {
    /// The dependent cannot work without this edge.
    Required,
    /// The edge enhances the dependent but may be skipped.
    Optional,
}

/// A parsed dependency edge: target id, optional version constraint, and
/// the required/optional marker.
///
/// Specs are ephemeral; they are re-derived from the raw strings whenever
/// the resolver walks the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Id of the configuration this edge points at.
    pub config_id: String,
    /// Version constraint on the target, if one was given.
    pub version_constraint: Option<VersionConstraint>,
    /// Required or optional edge.
    pub dependency_type: DependencyType,
}

fn spec_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^>=<]+)([>=<]+.*)$").expect("dependency pattern is valid"))
}

impl DependencySpec {
    /// Parses one raw dependency string.
    ///
    /// The `@optional` marker is stripped first, wherever it appears, and
    /// flips the edge to [`DependencyType::Optional`]. The remainder splits
    /// into id and constraint at the first comparison operator character;
    /// without one, the whole remainder is the id.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use aicm::catalog::{DependencySpec, DependencyType};
    ///
    /// let spec = DependencySpec::parse("foo>=1.0.0@optional");
    /// assert_eq!(spec.config_id, "foo");
    /// assert_eq!(spec.version_constraint.unwrap().to_string(), ">=1.0.0");
    /// assert_eq!(spec.dependency_type, DependencyType::Optional);
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (remainder, dependency_type) = if trimmed.contains(OPTIONAL_MARKER) {
            (
                trimmed.replace(OPTIONAL_MARKER, ""),
                DependencyType::Optional,
            )
        } else {
            (trimmed.to_string(), DependencyType::Required)
        };
        let remainder = remainder.trim();

        if let Some(caps) = spec_regex().captures(remainder) {
            Self {
                config_id: caps[1].trim().to_string(),
                version_constraint: Some(VersionConstraint::parse(&caps[2])),
                dependency_type,
            }
        } else {
            Self {
                config_id: remainder.to_string(),
                version_constraint: None,
                dependency_type,
            }
        }
    }

    /// True for optional edges.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.dependency_type == DependencyType::Optional
    }
}
