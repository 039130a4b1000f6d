//! Finding records: the output unit of a scan.
//!
//! Serialized field names and status strings are the wire contract consumed
//! by report renderers and downstream tooling; they must stay stable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::usage::TechnologyKind;

/// Support status for dataset-backed findings (runtimes and OS images).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportStatus {
    /// Inside the supported window
    Supported,
    /// EOL date within the near-threshold horizon
    #[serde(rename = "Near EOL")]
    NearEol,
    /// Past (or at) the EOL date
    #[serde(rename = "EOL")]
    Eol,
    /// Version missing, unresolvable, or absent from the dataset
    Unknown,
}

/// Maintenance signal for packages, derived from release age.
///
/// Deliberately a separate taxonomy from [`SupportStatus`]: packages have no
/// canonical EOL dataset, so they never carry EOL/Near EOL labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StalenessStatus {
    /// Released within the staleness threshold
    Active,
    /// No release for longer than the staleness threshold
    #[serde(rename = "Potentially unmaintained")]
    PotentiallyUnmaintained,
    /// No release date available
    Unknown,
}

/// Status of a finding: either a lifecycle support status or a package
/// staleness label, serialized into the single `status` wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FindingStatus {
    /// Dataset-backed lifecycle status
    Support(SupportStatus),
    /// Release-age maintenance signal
    Staleness(StalenessStatus),
}

impl FindingStatus {
    /// Whether this status represents a dataset-backed EOL condition.
    #[must_use]
    pub const fn is_eol(self) -> bool {
        matches!(self, Self::Support(SupportStatus::Eol))
    }

    /// Stable display string, identical to the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Support(SupportStatus::Supported) => "Supported",
            Self::Support(SupportStatus::NearEol) => "Near EOL",
            Self::Support(SupportStatus::Eol) => "EOL",
            Self::Support(SupportStatus::Unknown) | Self::Staleness(StalenessStatus::Unknown) => {
                "Unknown"
            }
            Self::Staleness(StalenessStatus::Active) => "Active",
            Self::Staleness(StalenessStatus::PotentiallyUnmaintained) => {
                "Potentially unmaintained"
            }
        }
    }
}

impl std::fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Remediation priority band derived from the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Stable display string, identical to the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Minimal => "MINIMAL",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One scan result. Immutable once emitted; the coordinator owns the
/// output list for the duration of a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Technology category ("runtime", "os", "package")
    #[serde(rename = "type")]
    pub kind: TechnologyKind,
    /// Display name
    pub name: String,
    /// Version string as discovered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Registry ecosystem, packages only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosystem: Option<String>,
    /// Lifecycle or staleness status
    pub status: FindingStatus,
    /// Scheduled EOL date, if the dataset has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eol_date: Option<NaiveDate>,
    /// Days until EOL; negative means already past
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_to_eol: Option<i64>,
    /// Latest version in the family, passed through from the dataset
    #[serde(rename = "latest", default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    /// Date of the package's most recent release
    #[serde(
        rename = "last_release",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_release_date: Option<NaiveDate>,
    /// Days since the package's most recent release
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_since_release: Option<i64>,
    /// Normalized risk score in [0, 1], present when scoring was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    /// Risk band derived from the score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    /// Fraction of the maximum feature weight that was available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Names of the features that actually contributed to the score
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features_used: Vec<String>,
}

impl Finding {
    /// Skeleton finding with an Unknown support status.
    #[must_use]
    pub fn unknown(kind: TechnologyKind, name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            version,
            ecosystem: None,
            status: FindingStatus::Support(SupportStatus::Unknown),
            eol_date: None,
            days_to_eol: None,
            latest_version: None,
            last_release_date: None,
            days_since_release: None,
            risk_score: None,
            risk_level: None,
            confidence: None,
            features_used: Vec::new(),
        }
    }
}
