//! Drug record model for ndcserve
//!
//! A `DrugRecord` is the resolved entity returned by assisted lookup. It
//! is constructed per request from whichever source answered and is never
//! mutated afterwards. Backup-sourced records leave the primary-only
//! enrichment fields unset; the shape-compatible fields reconcile into
//! the same external representation regardless of provenance, so callers
//! never branch on the source tag.

use serde::{Deserialize, Serialize};

/// Which source produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Primary,
    Backup,
}

/// A resolved drug record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugRecord {
    /// Normalized labeler-product key.
    pub key: String,
    /// Dashed NDC-10 display identifier, when the source carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndc10: Option<String>,
    /// Proprietary (brand) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proprietary_name: Option<String>,
    /// Non-proprietary (generic) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonproprietary_name: Option<String>,
    /// Active substance name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substance_name: Option<String>,
    /// Dosage form (tablet, solution, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage_form: Option<String>,
    /// Route of administration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Composed strength display text ("500 mg").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
    /// DEA schedule class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dea_schedule: Option<String>,

    // Enrichment fields only the primary source can populate. They stay
    // None on backup-sourced records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discontinued: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortage: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refrigerated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institutional_code: Option<String>,

    /// Provenance tag.
    #[serde(rename = "_source")]
    pub source: Provenance,
}

impl DrugRecord {
    /// An empty record for the given key and provenance.
    pub fn new(key: impl Into<String>, source: Provenance) -> Self {
        Self {
            key: key.into(),
            ndc10: None,
            proprietary_name: None,
            nonproprietary_name: None,
            substance_name: None,
            dosage_form: None,
            route: None,
            strength: None,
            dea_schedule: None,
            discontinued: None,
            shortage: None,
            refrigerated: None,
            institutional_code: None,
            source,
        }
    }
}

/// Compose strength display text from a numerator value and unit.
///
/// Both parts must be present and non-blank, otherwise no text is
/// composed at all.
pub fn strength_display(value: Option<&str>, unit: Option<&str>) -> Option<String> {
    match (value, unit) {
        (Some(v), Some(u)) if !v.trim().is_empty() && !u.trim().is_empty() => {
            Some(format!("{} {}", v.trim(), u.trim()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_tag_serialization() {
        let record = DrugRecord::new("456-12", Provenance::Backup);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["_source"], "backup");
        assert_eq!(json["key"], "456-12");
    }

    #[test]
    fn test_unset_fields_omitted() {
        let record = DrugRecord::new("1-2", Provenance::Primary);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("strength").is_none());
        assert!(json.get("discontinued").is_none());
    }

    #[test]
    fn test_strength_display_requires_both_parts() {
        assert_eq!(strength_display(Some("500"), Some("mg")), Some("500 mg".into()));
        assert_eq!(strength_display(Some("500"), None), None);
        assert_eq!(strength_display(None, Some("mg")), None);
        assert_eq!(strength_display(Some(" "), Some("mg")), None);
    }

    #[test]
    fn test_backup_and_primary_share_shape() {
        let mut backup = DrugRecord::new("1-2", Provenance::Backup);
        backup.proprietary_name = Some("Foo".into());
        let mut primary = DrugRecord::new("1-2", Provenance::Primary);
        primary.proprietary_name = Some("Foo".into());

        let b = serde_json::to_value(&backup).unwrap();
        let p = serde_json::to_value(&primary).unwrap();
        assert_eq!(b["proprietary_name"], p["proprietary_name"]);
        assert_eq!(b["key"], p["key"]);
    }
}
