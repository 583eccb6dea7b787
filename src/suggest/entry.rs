//! Suggestion entries and their caller-facing projection.

use serde::Serialize;

use crate::source::SuggestRow;

/// One indexed entry.
///
/// Carries the display fields plus precomputed lowercase and digits-only
/// shadows used for matching. Shadows are never serialized to callers.
#[derive(Debug, Clone)]
pub struct SuggestEntry {
    pub key: String,
    pub ndc10: String,
    pub brand: Option<String>,
    pub generic: Option<String>,
    pub substance: Option<String>,
    pub strength: Option<String>,

    // Matching shadows.
    pub(crate) key_lower: String,
    pub(crate) digits: String,
    pub(crate) brand_lower: Option<String>,
    pub(crate) generic_lower: Option<String>,
    pub(crate) substance_lower: Option<String>,
}

impl SuggestEntry {
    /// Build an entry from a loaded row, precomputing the shadows.
    ///
    /// The digits shadow prefers the row's digits column and falls back
    /// to stripping the dashed identifier.
    pub fn from_row(row: SuggestRow) -> Self {
        let digits = row.digit_shadow();
        Self {
            key_lower: row.key.to_lowercase(),
            digits,
            brand_lower: row.brand.as_ref().map(|s| s.to_lowercase()),
            generic_lower: row.generic.as_ref().map(|s| s.to_lowercase()),
            substance_lower: row.substance.as_ref().map(|s| s.to_lowercase()),
            key: row.key,
            ndc10: row.ndc10,
            brand: row.brand,
            generic: row.generic,
            substance: row.substance,
            strength: row.strength,
        }
    }

    /// The lean projection returned to callers.
    pub fn item(&self) -> SuggestItem {
        SuggestItem {
            key: self.key.clone(),
            ndc10: self.ndc10.clone(),
            brand: self.brand.clone(),
            generic: self.generic.clone(),
            substance: self.substance.clone(),
            strength: self.strength.clone(),
        }
    }
}

/// Caller-facing suggestion result with shadows stripped.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SuggestItem {
    pub key: String,
    pub ndc10: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
}

/// Construct an entry directly (test fixtures).
#[cfg(test)]
pub(crate) fn entry(
    key: &str,
    ndc10: &str,
    brand: Option<&str>,
    generic: Option<&str>,
) -> SuggestEntry {
    SuggestEntry::from_row(SuggestRow {
        key: key.to_string(),
        ndc10: ndc10.to_string(),
        digits: None,
        brand: brand.map(|s| s.to_string()),
        generic: generic.map(|s| s.to_string()),
        substance: None,
        strength: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndc::digits_only;

    #[test]
    fn test_shadows_precomputed() {
        let e = entry("12345-6789", "12345-6789-01", Some("Foo"), Some("BAR"));
        assert_eq!(e.key_lower, "12345-6789");
        assert_eq!(e.digits, "12345678901");
        assert_eq!(e.brand_lower.as_deref(), Some("foo"));
        assert_eq!(e.generic_lower.as_deref(), Some("bar"));
    }

    #[test]
    fn test_digits_column_preferred() {
        let e = SuggestEntry::from_row(SuggestRow {
            key: "1-2".into(),
            ndc10: "0001-0002-03".into(),
            digits: Some("99999999999".into()),
            brand: None,
            generic: None,
            substance: None,
            strength: None,
        });
        assert_eq!(e.digits, "99999999999");
    }

    #[test]
    fn test_item_strips_shadows() {
        let e = entry("12345-6789", "12345-6789-01", Some("Foo"), None);
        let json = serde_json::to_value(e.item()).unwrap();
        assert!(json.get("key_lower").is_none());
        assert!(json.get("digits").is_none());
        assert_eq!(json["brand"], "Foo");
        // Optional fields absent entirely, not null.
        assert!(json.get("generic").is_none());
    }

    #[test]
    fn test_digits_shadow_matches_strip() {
        assert_eq!(digits_only("12345-6789-01"), "12345678901");
    }
}
