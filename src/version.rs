// src/version.rs

//! Dotted version comparison for update checks.
//!
//! Package versions on PyPI are compared numerically component by
//! component; a leading `v` is stripped and missing or non-numeric
//! components count as 0.

use std::cmp::Ordering;

fn components(version: &str) -> Vec<u64> {
    version
        .trim()
        .trim_start_matches('v')
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

/// Compare two dotted versions.
pub fn compare(a: &str, b: &str) -> Ordering {
    let pa = components(a);
    let pb = components(b);
    let len = pa.len().max(pb.len());

    for i in 0..len {
        let na = pa.get(i).copied().unwrap_or(0);
        let nb = pb.get(i).copied().unwrap_or(0);
        match na.cmp(&nb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

/// Whether `latest` is strictly newer than `current`.
pub fn has_update(current: &str, latest: &str) -> bool {
    compare(current, latest) == Ordering::Less
}

/// Classification of an available update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateType {
    Major,
    Minor,
    Patch,
}

/// Classify the jump from `current` to `latest`.
pub fn update_type(current: &str, latest: &str) -> UpdateType {
    let cur = components(current);
    let lat = components(latest);
    let at = |v: &[u64], i: usize| v.get(i).copied().unwrap_or(0);

    if at(&lat, 0) > at(&cur, 0) {
        UpdateType::Major
    } else if at(&lat, 1) > at(&cur, 1) {
        UpdateType::Minor
    } else {
        UpdateType::Patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_component_wise() {
        assert_eq!(compare("1.2.3", "1.2.3"), Ordering::Equal);
        assert_eq!(compare("1.2.3", "1.10.0"), Ordering::Less);
        assert_eq!(compare("2.0", "1.9.9"), Ordering::Greater);
    }

    #[test]
    fn missing_components_count_as_zero() {
        assert_eq!(compare("1.2", "1.2.0"), Ordering::Equal);
        assert_eq!(compare("1.2", "1.2.1"), Ordering::Less);
    }

    #[test]
    fn v_prefix_is_ignored() {
        assert_eq!(compare("v1.2.3", "1.2.3"), Ordering::Equal);
    }

    #[test]
    fn update_flag_and_type() {
        assert!(has_update("1.0.0", "2.0.0"));
        assert!(!has_update("2.0.0", "2.0.0"));
        assert_eq!(update_type("1.0.0", "2.0.0"), UpdateType::Major);
        assert_eq!(update_type("1.0.0", "1.1.0"), UpdateType::Minor);
        assert_eq!(update_type("1.0.0", "1.0.1"), UpdateType::Patch);
        // Two-component versions must not panic on the minor check.
        assert_eq!(update_type("1", "1"), UpdateType::Patch);
    }
}
