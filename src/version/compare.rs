//! Version comparison primitive shared by constraint evaluation.

use std::cmp::Ordering;

/// Compares two version strings.
///
/// Both versions are split on `.`; when every component of both parses as
/// an unsigned integer, the shorter side is zero-padded and the versions
/// compare as integer tuples, so `"1.2"` equals `"1.2.0"` and `"1.10"`
/// sorts after `"1.9"`. When any component is non-numeric the raw strings
/// compare lexicographically instead. The lexicographic fallback is
/// load-bearing for catalogs that carry non-numeric versions such as
/// `"2024-05-01"` or `"beta"`.
///
/// # Examples
///
/// ```rust
/// use std::cmp::Ordering;
/// use aicm::version::compare_versions;
///
/// assert_eq!(compare_versions("1.2.0", "1.2"), Ordering::Equal);
/// assert_eq!(compare_versions("1.10.0", "1.9.3"), Ordering::Greater);
/// assert_eq!(compare_versions("alpha", "beta"), Ordering::Less);
/// ```
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (numeric_components(a), numeric_components(b)) {
        (Some(mut left), Some(mut right)) => {
            let width = left.len().max(right.len());
            left.resize(width, 0);
            right.resize(width, 0);
            left.cmp(&right)
        }
        _ => a.cmp(b),
    }
}

/// Splits a version into numeric components, or `None` if any component
/// fails to parse as an unsigned integer.
fn numeric_components(version: &str) -> Option<Vec<u64>> {
    version
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ordering() {
        assert_eq!(compare_versions("1.0.0", "2.0.0"), Ordering::Less);
        assert_eq!(compare_versions("2.0.0", "1.0.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.2.3", "1.2.3"), Ordering::Equal);
    }

    #[test]
    fn test_zero_padding() {
        assert_eq!(compare_versions("1.2", "1.2.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.2", "1.2.1"), Ordering::Less);
        assert_eq!(compare_versions("2", "1.9.9"), Ordering::Greater);
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        // Would be Less under string comparison.
        assert_eq!(compare_versions("1.10.0", "1.9.0"), Ordering::Greater);
    }

    #[test]
    fn test_lexicographic_fallback() {
        assert_eq!(compare_versions("1.0.0-beta", "1.0.0"), Ordering::Greater);
        assert_eq!(compare_versions("alpha", "beta"), Ordering::Less);
        assert_eq!(compare_versions("2024-05-01", "2024-05-01"), Ordering::Equal);
    }

    #[test]
    fn test_mixed_falls_back_to_raw() {
        // One numeric, one not: raw string comparison decides.
        assert_eq!(compare_versions("1.2.x", "1.2.0"), Ordering::Greater);
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(compare_versions("", ""), Ordering::Equal);
        assert_eq!(compare_versions("", "1.0"), Ordering::Less);
    }
}
