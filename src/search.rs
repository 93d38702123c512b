//! Keyword search over reading units
//!
//! Drives visual emphasis only: the result is the set of unit indices to
//! highlight, nothing else depends on it.

use crate::segment::ReadingUnit;

/// Indices of units whose text contains the keyword, case-insensitively
///
/// An empty (or whitespace-only) keyword matches nothing, which is how the
/// UI clears emphasis.
pub fn filter(units: &[ReadingUnit], keyword: &str) -> Vec<usize> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return Vec::new();
    }

    units
        .iter()
        .filter(|unit| unit.text.to_lowercase().contains(&keyword))
        .map(|unit| unit.index)
        .collect()
}
