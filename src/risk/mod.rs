//! Risk scoring: combines lifecycle and staleness outputs with auxiliary
//! signals into a normalized score, a level band, and a confidence value.
//!
//! Every feature is independently normalized into [0, 1]; the overall score
//! is a weighted mean over the features actually present, with the weights
//! renormalized over that subset. Two findings with the same score can rest
//! on different evidence, which is why `features_used` is recorded.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::RiskWeights;
use crate::model::RiskLevel;

/// Days over which remaining support decays the EOL sub-score to zero.
const EOL_HORIZON_DAYS: f64 = 365.0;

/// Days of release age at which the staleness sub-score saturates.
const STALENESS_HORIZON_DAYS: f64 = 730.0;

/// Advisory count at which the advisory sub-score saturates.
const ADVISORY_SATURATION: f64 = 10.0;

/// Lower bounds of the risk bands, in ascending order.
const LEVEL_LOW: f64 = 0.2;
const LEVEL_MEDIUM: f64 = 0.4;
const LEVEL_HIGH: f64 = 0.6;
const LEVEL_CRITICAL: f64 = 0.8;

/// Feature names in the scorer's fixed order, matching
/// [`RiskWeights::as_array`].
const FEATURE_NAMES: [&str; 4] = [
    "days_to_eol",
    "days_since_release",
    "advisory_count",
    "ecosystem_popularity",
];

/// Raw inputs to the scorer for one item. Absent fields are features the
/// scan could not observe; they reduce confidence rather than the score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskSignals {
    /// Days until EOL (negative when already past)
    pub days_to_eol: Option<i64>,
    /// Days since the most recent package release
    pub days_since_release: Option<i64>,
    /// Number of known security advisories
    pub advisory_count: Option<u32>,
    /// Ecosystem popularity in [0, 1], higher means more popular
    pub ecosystem_popularity: Option<f64>,
}

impl RiskSignals {
    /// Whether any feature is present at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.days_to_eol.is_none()
            && self.days_since_release.is_none()
            && self.advisory_count.is_none()
            && self.ecosystem_popularity.is_none()
    }
}

/// Scoring output for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Weighted-mean score in [0, 1]
    pub risk_score: f64,
    /// Band derived from the score
    pub risk_level: RiskLevel,
    /// Fraction of the total feature weight that was available
    pub confidence: f64,
    /// Features that contributed, in the scorer's fixed order
    pub features_used: Vec<String>,
}

/// Score one item from whatever signals are available.
///
/// Returns `None` when no feature is present: an item with zero observable
/// signals gets no score rather than a fabricated one. A single weak
/// feature still scores, with proportionally low confidence.
#[must_use]
pub fn score(signals: &RiskSignals, weights: &RiskWeights) -> Option<RiskAssessment> {
    if signals.is_empty() {
        return None;
    }

    let sub_scores = [
        signals.days_to_eol.map(eol_sub_score),
        signals.days_since_release.map(staleness_sub_score),
        signals.advisory_count.map(advisory_sub_score),
        signals.ecosystem_popularity.map(popularity_sub_score),
    ];

    let raw_weights = weights.as_array();
    let available_weight: f64 = raw_weights
        .iter()
        .zip(&sub_scores)
        .filter(|(_, s)| s.is_some())
        .map(|(w, _)| w)
        .sum();
    if available_weight <= 0.0 {
        return None;
    }

    let mut risk_score = 0.0;
    let mut features_used = Vec::new();
    for ((weight, sub_score), name) in raw_weights.iter().zip(&sub_scores).zip(FEATURE_NAMES) {
        if let Some(sub_score) = sub_score {
            risk_score += sub_score * weight / available_weight;
            features_used.push(name.to_string());
        }
    }
    let risk_score = risk_score.clamp(0.0, 1.0);
    let confidence = (available_weight / weights.total()).clamp(0.0, 1.0);

    trace!(risk_score, confidence, ?features_used, "scored item");
    Some(RiskAssessment {
        risk_score,
        risk_level: level_for(risk_score),
        confidence,
        features_used,
    })
}

/// Map a score to its band. Bands are left-inclusive; 1.0 is Critical.
#[must_use]
pub fn level_for(score: f64) -> RiskLevel {
    if score >= LEVEL_CRITICAL {
        RiskLevel::Critical
    } else if score >= LEVEL_HIGH {
        RiskLevel::High
    } else if score >= LEVEL_MEDIUM {
        RiskLevel::Medium
    } else if score >= LEVEL_LOW {
        RiskLevel::Low
    } else {
        RiskLevel::Minimal
    }
}

/// 1.0 at or past EOL, linear decay to 0 over a one-year horizon.
fn eol_sub_score(days_to_eol: i64) -> f64 {
    if days_to_eol <= 0 {
        1.0
    } else {
        (1.0 - days_to_eol as f64 / EOL_HORIZON_DAYS).max(0.0)
    }
}

/// Linear rise to 1.0 over two years of release age.
fn staleness_sub_score(days_since_release: i64) -> f64 {
    (days_since_release.max(0) as f64 / STALENESS_HORIZON_DAYS).min(1.0)
}

/// Saturates once ten or more advisories are known.
fn advisory_sub_score(advisory_count: u32) -> f64 {
    (f64::from(advisory_count) / ADVISORY_SATURATION).min(1.0)
}

/// Popular ecosystems carry less risk.
fn popularity_sub_score(popularity: f64) -> f64 {
    1.0 - popularity.clamp(0.0, 1.0)
}
