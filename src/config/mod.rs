//! Scan configuration and risk-scoring weights.
//!
//! Thresholds and weights live here as data so tuning them never touches
//! classification or scoring logic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EolScanError, Result};

/// Default Near EOL horizon, in months.
pub const DEFAULT_NEAR_MONTHS: u32 = 6;

/// Default package staleness threshold, in months.
pub const DEFAULT_STALE_MONTHS: u32 = 24;

/// Per-scan configuration.
///
/// One value of this struct applies to every item in a scan; batch mode
/// gives each scan its own copy so thresholds never leak across scans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Months of remaining support below which a finding is Near EOL
    pub near_months: u32,
    /// Months without a release after which a package is potentially
    /// unmaintained
    pub stale_months: u32,
    /// Override for "today", used for reproducible scans and tests.
    /// `None` means the current UTC date.
    pub today: Option<NaiveDate>,
    /// Whether to attach risk scores to findings
    pub score_risk: bool,
    /// Feature weights for the risk scorer
    pub weights: RiskWeights,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            near_months: DEFAULT_NEAR_MONTHS,
            stale_months: DEFAULT_STALE_MONTHS,
            today: None,
            score_risk: true,
            weights: RiskWeights::default(),
        }
    }
}

impl ScanConfig {
    /// Resolve the effective "today" for this scan.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }

    /// Validate threshold and weight values.
    pub fn validate(&self) -> Result<()> {
        if self.near_months == 0 {
            return Err(EolScanError::config("near_months must be at least 1"));
        }
        if self.stale_months == 0 {
            return Err(EolScanError::config("stale_months must be at least 1"));
        }
        self.weights.validate()
    }
}

/// Fixed per-feature weights for the risk scorer.
///
/// Only features available for a given item contribute; the scorer
/// renormalizes over the present subset at scoring time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskWeights {
    /// Proximity to (or distance past) the EOL date
    pub days_to_eol: f64,
    /// Age of the most recent package release
    pub days_since_release: f64,
    /// Known security advisories against the item
    pub advisory_count: f64,
    /// Ecosystem popularity (popular ecosystems get more scrutiny and
    /// faster fixes, so high popularity lowers risk)
    pub ecosystem_popularity: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            days_to_eol: 0.4,
            days_since_release: 0.3,
            advisory_count: 0.2,
            ecosystem_popularity: 0.1,
        }
    }
}

impl RiskWeights {
    /// Weights as an array, in the scorer's fixed feature order.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 4] {
        [
            self.days_to_eol,
            self.days_since_release,
            self.advisory_count,
            self.ecosystem_popularity,
        ]
    }

    /// Sum of all feature weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }

    fn validate(&self) -> Result<()> {
        if self.as_array().iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(EolScanError::config(
                "risk weights must be finite and non-negative",
            ));
        }
        if self.total() <= 0.0 {
            return Err(EolScanError::config(
                "at least one risk weight must be positive",
            ));
        }
        Ok(())
    }
}
