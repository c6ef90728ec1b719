//! Version constraint parsing and evaluation.

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;

use super::compare::compare_versions;

/// Comparison operator of a version constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintOp {
    /// `>=` - at least the given version.
    GreaterEq,
    /// `>` - strictly newer than the given version.
    Greater,
    /// `<=` - at most the given version.
    LessEq,
    /// `<` - strictly older than the given version.
    Less,
    /// `==` - exactly the given version.
    Equal,
    /// `!=` - anything but the given version.
    NotEqual,
}

impl ConstraintOp {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">=" => Some(Self::GreaterEq),
            ">" => Some(Self::Greater),
            "<=" => Some(Self::LessEq),
            "<" => Some(Self::Less),
            "==" => Some(Self::Equal),
            "!=" => Some(Self::NotEqual),
            _ => None,
        }
    }

    /// The textual operator as it appears in dependency strings.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::GreaterEq => ">=",
            Self::Greater => ">",
            Self::LessEq => "<=",
            Self::Less => "<",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

/// A parsed version constraint such as `>=1.2.0`.
///
/// Constraints are evaluated with [`compare_versions`], so zero-padding and
/// the lexicographic fallback apply to the constrained version as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionConstraint {
    /// Comparison operator.
    pub op: ConstraintOp,
    /// Version the operator compares against.
    pub version: String,
}

fn constraint_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([>=<!]+)(.+)$").expect("constraint pattern is valid"))
}

impl VersionConstraint {
    /// Parses a constraint string.
    ///
    /// A string without a leading operator is an exact-match constraint on
    /// that version. An operator run that is not one of the six known
    /// operators also collapses to exact matching, so malformed input still
    /// yields a usable constraint instead of an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use aicm::version::{ConstraintOp, VersionConstraint};
    ///
    /// let c = VersionConstraint::parse(">=1.2.0");
    /// assert_eq!(c.op, ConstraintOp::GreaterEq);
    /// assert_eq!(c.version, "1.2.0");
    ///
    /// let bare = VersionConstraint::parse("2.0");
    /// assert_eq!(bare.op, ConstraintOp::Equal);
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(caps) = constraint_regex().captures(raw) {
            let version = caps[2].trim().to_string();
            match ConstraintOp::from_symbol(&caps[1]) {
                Some(op) => Self { op, version },
                None => Self {
                    op: ConstraintOp::Equal,
                    version,
                },
            }
        } else {
            Self {
                op: ConstraintOp::Equal,
                version: raw.to_string(),
            }
        }
    }

    /// Evaluates the constraint against an actual version.
    #[must_use]
    pub fn matches(&self, actual: &str) -> bool {
        let ordering = compare_versions(actual, &self.version);
        match self.op {
            ConstraintOp::GreaterEq => ordering != Ordering::Less,
            ConstraintOp::Greater => ordering == Ordering::Greater,
            ConstraintOp::LessEq => ordering != Ordering::Greater,
            ConstraintOp::Less => ordering == Ordering::Less,
            ConstraintOp::Equal => ordering == Ordering::Equal,
            ConstraintOp::NotEqual => ordering != Ordering::Equal,
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.symbol(), self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_operators() {
        let cases = [
            (">=1.0", ConstraintOp::GreaterEq),
            (">1.0", ConstraintOp::Greater),
            ("<=1.0", ConstraintOp::LessEq),
            ("<1.0", ConstraintOp::Less),
            ("==1.0", ConstraintOp::Equal),
            ("!=1.0", ConstraintOp::NotEqual),
        ];
        for (raw, op) in cases {
            let constraint = VersionConstraint::parse(raw);
            assert_eq!(constraint.op, op, "operator of {raw}");
            assert_eq!(constraint.version, "1.0");
        }
    }

    #[test]
    fn test_parse_bare_version_is_exact() {
        let constraint = VersionConstraint::parse("1.2.3");
        assert_eq!(constraint.op, ConstraintOp::Equal);
        assert_eq!(constraint.version, "1.2.3");
    }

    #[test]
    fn test_parse_unknown_operator_falls_back_to_exact() {
        let constraint = VersionConstraint::parse(">>=2.0");
        assert_eq!(constraint.op, ConstraintOp::Equal);
        assert_eq!(constraint.version, "2.0");
    }

    #[test]
    fn test_greater_eq_matching() {
        let constraint = VersionConstraint::parse(">=1.2.0");
        assert!(!constraint.matches("1.1.9"));
        assert!(constraint.matches("1.2.0"));
        assert!(constraint.matches("1.3.0"));
        // "1.2" zero-pads to 1.2.0.
        assert!(constraint.matches("1.2"));
    }

    #[test]
    fn test_strict_bounds() {
        assert!(!VersionConstraint::parse(">1.2.0").matches("1.2.0"));
        assert!(VersionConstraint::parse(">1.2.0").matches("1.2.1"));
        assert!(!VersionConstraint::parse("<2.0").matches("2.0.0"));
        assert!(VersionConstraint::parse("<2.0").matches("1.999"));
    }

    #[test]
    fn test_not_equal() {
        let constraint = VersionConstraint::parse("!=1.0");
        assert!(!constraint.matches("1.0.0"));
        assert!(constraint.matches("1.0.1"));
    }

    #[test]
    fn test_lexicographic_constraint() {
        let constraint = VersionConstraint::parse(">=beta");
        assert!(constraint.matches("beta"));
        assert!(constraint.matches("gamma"));
        assert!(!constraint.matches("alpha"));
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(VersionConstraint::parse(">=1.2.0").to_string(), ">=1.2.0");
        assert_eq!(VersionConstraint::parse("1.2.0").to_string(), "==1.2.0");
    }
}
