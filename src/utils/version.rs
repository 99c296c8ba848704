//! Dotted version string comparison.

use std::cmp::Ordering;

/// Compare two dotted version strings fragment by fragment.
///
/// Numeric fragments compare numerically, anything else as text. A missing
/// fragment counts as `0`, so `"1.4"` equals `"1.4.0"`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.trim().split('.').collect();
    let right: Vec<&str> = b.trim().split('.').collect();
    let len = left.len().max(right.len());

    for idx in 0..len {
        let l = left.get(idx).copied().unwrap_or("0");
        let r = right.get(idx).copied().unwrap_or("0");
        let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            _ => l.cmp(r),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Number of dot separated fragments in a version string.
pub fn fragment_count(version: &str) -> usize {
    let trimmed = version.trim();
    if trimmed.is_empty() {
        0
    } else {
        trimmed.split('.').count()
    }
}
