//! NDC key derivation for ndcserve
//!
//! Raw drug-code strings arrive in several historical digit-width
//! conventions. A 10-digit code is ambiguous (4-4-2, 5-3-2 or 5-4-1
//! segmentation), so derivation produces an ordered set of candidate
//! labeler-product keys rather than a single key. Callers try each
//! candidate against the data sources until one hits.
//!
//! # API
//!
//! - `candidate_keys(raw)` - Derive candidate lookup keys from raw input
//! - `digits_only(s)` - Strip every non-digit character
//! - `LookupKey` - A normalized labeler-product pair

use std::fmt;

/// A normalized labeler-product lookup key.
///
/// Both segments carry no leading zeros (a segment that is all zeros
/// collapses to a single "0"). Displayed as `labeler-product`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey {
    labeler: String,
    product: String,
}

impl LookupKey {
    /// Build a key from raw segments, trimming leading zeros.
    pub fn new(labeler: &str, product: &str) -> Self {
        Self {
            labeler: trim_leading_zeros(labeler),
            product: trim_leading_zeros(product),
        }
    }

    /// The labeler segment.
    pub fn labeler(&self) -> &str {
        &self.labeler
    }

    /// The product segment.
    pub fn product(&self) -> &str {
        &self.product
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.labeler, self.product)
    }
}

/// Strip every character that is not an ASCII digit.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn trim_leading_zeros(segment: &str) -> String {
    let trimmed = segment.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Derive the ordered candidate key set for a raw drug-code string.
///
/// - 11 digits: 5-4-2 (one candidate).
/// - 10 digits: 4-4-2, then 5-3-2, then 5-4-1 (three candidates).
/// - Fewer than 10: left-padded to 10 for the ambiguous shapes, and to
///   11 for the 5-4-2 shape.
/// - No digits, or more than 11: no candidates.
///
/// Duplicates collapsing to the same normalized key are removed while
/// preserving first-seen order. Malformed input never errors; it simply
/// derives an empty set.
pub fn candidate_keys(raw: &str) -> Vec<LookupKey> {
    let digits = digits_only(raw);
    if digits.is_empty() || digits.len() > 11 {
        return Vec::new();
    }

    let mut candidates = Vec::new();

    if digits.len() == 11 {
        candidates.push(segment(&digits, 5, 4));
    } else {
        let ten = pad_left(&digits, 10);
        candidates.push(segment(&ten, 4, 4));
        candidates.push(segment(&ten, 5, 3));
        candidates.push(segment(&ten, 5, 4));

        let eleven = pad_left(&digits, 11);
        candidates.push(segment(&eleven, 5, 4));
    }

    dedup_preserving_order(candidates)
}

fn segment(digits: &str, labeler_width: usize, product_width: usize) -> LookupKey {
    LookupKey::new(
        &digits[..labeler_width],
        &digits[labeler_width..labeler_width + product_width],
    )
}

fn pad_left(digits: &str, width: usize) -> String {
    if digits.len() >= width {
        digits.to_string()
    } else {
        let mut padded = "0".repeat(width - digits.len());
        padded.push_str(digits);
        padded
    }
}

fn dedup_preserving_order(keys: Vec<LookupKey>) -> Vec<LookupKey> {
    let mut seen = Vec::new();
    for key in keys {
        if !seen.contains(&key) {
            seen.push(key);
        }
    }
    seen
}
