//! Lifecycle dataset rows, modeled on the endoflife.date API schema.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Union type for dataset fields that can be a date string or a boolean.
///
/// The endoflife.date API returns `"eol": "2025-04-30"`, `"eol": true`
/// (already reached), or `"eol": false` (no date scheduled).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateOrBool {
    /// A date string (e.g., "2025-04-30")
    Date(String),
    /// A boolean milestone marker
    Bool(bool),
}

impl DateOrBool {
    /// Parse as a `NaiveDate`, if the value is a date string.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
            Self::Bool(_) => None,
        }
    }

    /// Whether this value pins the milestone as already reached regardless
    /// of the scan date (`Bool(true)`).
    #[must_use]
    pub const fn is_flagged_reached(&self) -> bool {
        matches!(self, Self::Bool(true))
    }
}

/// One row of the lifecycle dataset for a family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleCycle {
    /// Canonical version label for this cycle (e.g., "3.9", "22.04", "8")
    pub cycle: String,
    /// EOL date or flag; absent means not yet scheduled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eol: Option<DateOrBool>,
    /// Latest version released in this family
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
    /// Release date of this cycle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Date of the latest release in this cycle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_release_date: Option<String>,
}

impl LifecycleCycle {
    /// Build a cycle with just a key and EOL date, for tests and fixtures.
    #[must_use]
    pub fn new(cycle: impl Into<String>, eol: Option<NaiveDate>) -> Self {
        Self {
            cycle: cycle.into(),
            eol: eol.map(|d| DateOrBool::Date(d.format("%Y-%m-%d").to_string())),
            latest: None,
            release_date: None,
            latest_release_date: None,
        }
    }

    /// Attach the family's latest version.
    #[must_use]
    pub fn with_latest(mut self, latest: impl Into<String>) -> Self {
        self.latest = Some(latest.into());
        self
    }

    /// The effective EOL date, if one is scheduled.
    #[must_use]
    pub fn eol_date(&self) -> Option<NaiveDate> {
        self.eol.as_ref().and_then(DateOrBool::as_date)
    }
}

/// The lifecycle dataset: family slug → ordered release cycles.
///
/// Loaded once by the caller and shared read-only across scans. Within one
/// family, cycle keys are unique; lookups that miss degrade to an Unknown
/// status, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifecycleTable {
    families: IndexMap<String, Vec<LifecycleCycle>>,
}

impl LifecycleTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the cycles for a family.
    pub fn insert(&mut self, slug: impl Into<String>, cycles: Vec<LifecycleCycle>) {
        self.families.insert(slug.into(), cycles);
    }

    /// All cycles for a family, if the family is known.
    #[must_use]
    pub fn family(&self, slug: &str) -> Option<&[LifecycleCycle]> {
        self.families.get(slug).map(Vec::as_slice)
    }

    /// Look up a specific cycle within a family.
    #[must_use]
    pub fn cycle(&self, slug: &str, cycle_key: &str) -> Option<&LifecycleCycle> {
        self.family(slug)?.iter().find(|c| c.cycle == cycle_key)
    }

    /// The latest version recorded for a family (taken from the newest
    /// cycle row that carries one; the API lists newest first).
    #[must_use]
    pub fn latest_version(&self, slug: &str) -> Option<&str> {
        self.family(slug)?
            .iter()
            .find_map(|c| c.latest.as_deref())
    }

    /// Number of families loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Whether the table holds no families.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Iterate over family slugs in insertion order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_or_bool_deserialization() {
        let date: DateOrBool = serde_json::from_str("\"2025-04-30\"").unwrap();
        assert!(matches!(date, DateOrBool::Date(_)));
        assert_eq!(
            date.as_date(),
            Some(NaiveDate::from_ymd_opt(2025, 4, 30).unwrap())
        );

        let flag: DateOrBool = serde_json::from_str("true").unwrap();
        assert!(flag.is_flagged_reached());
        assert!(flag.as_date().is_none());

        let flag: DateOrBool = serde_json::from_str("false").unwrap();
        assert!(!flag.is_flagged_reached());
    }

    #[test]
    fn test_cycle_deserialization_from_api_shape() {
        let json = r#"{
            "cycle": "3.9",
            "releaseDate": "2020-10-05",
            "eol": "2025-10-31",
            "latest": "3.9.18",
            "latestReleaseDate": "2023-08-24"
        }"#;
        let cycle: LifecycleCycle = serde_json::from_str(json).unwrap();
        assert_eq!(cycle.cycle, "3.9");
        assert_eq!(
            cycle.eol_date(),
            Some(NaiveDate::from_ymd_opt(2025, 10, 31).unwrap())
        );
        assert_eq!(cycle.latest.as_deref(), Some("3.9.18"));
    }

    #[test]
    fn test_table_lookup() {
        let mut table = LifecycleTable::new();
        table.insert(
            "python",
            vec![
                LifecycleCycle::new("3.12", None).with_latest("3.12.1"),
                LifecycleCycle::new("3.9", NaiveDate::from_ymd_opt(2025, 10, 31)),
            ],
        );

        assert!(table.family("python").is_some());
        assert!(table.family("nodejs").is_none());
        assert_eq!(table.cycle("python", "3.9").unwrap().cycle, "3.9");
        assert!(table.cycle("python", "2.7").is_none());
        assert_eq!(table.latest_version("python"), Some("3.12.1"));
    }

    #[test]
    fn test_empty_table() {
        let table = LifecycleTable::new();
        assert!(table.is_empty());
        assert!(table.family("python").is_none());
    }
}
