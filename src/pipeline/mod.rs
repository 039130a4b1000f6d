//! Pipeline coordinator: drives reconciliation, classification, staleness
//! evaluation, and risk scoring over one scan's evidence.
//!
//! Items are independent, so classification runs in parallel. A scan never
//! fails because one item is Unknown or unscoreable; every reconciled usage
//! produces exactly one finding.

use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::{classify, evaluate_staleness};
use crate::config::ScanConfig;
use crate::discovery::reconcile;
use crate::error::Result;
use crate::model::{Finding, FindingStatus, LifecycleTable, TechnologyKind, TechnologyUsage};
use crate::risk::{score, RiskSignals};

/// Registry metadata for one package, fetched before the scan runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Date of the most recent release
    pub last_release_date: Option<NaiveDate>,
    /// Latest published version
    pub latest_version: Option<String>,
}

/// Optional auxiliary risk signals for one item, supplied externally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AuxSignals {
    /// Number of known security advisories
    pub advisory_count: Option<u32>,
    /// Popularity override in [0, 1]
    pub ecosystem_popularity: Option<f64>,
}

/// Everything a scan consumes. All fetching happens before the pipeline
/// runs; the coordinator itself does no I/O.
#[derive(Debug, Clone, Default)]
pub struct ScanInput {
    /// Raw evidence from every discovery source, in discovery order
    pub evidence: Vec<TechnologyUsage>,
    /// Lifecycle dataset for runtimes and OS families
    pub dataset: LifecycleTable,
    /// Registry release metadata keyed by [`package_key`]
    pub releases: HashMap<String, ReleaseInfo>,
    /// Auxiliary risk signals keyed by [`package_key`]
    pub signals: HashMap<String, AuxSignals>,
}

/// Lookup key for per-package side tables: `ecosystem:name`, lowercased.
#[must_use]
pub fn package_key(ecosystem: &str, name: &str) -> String {
    format!("{}:{}", ecosystem.to_lowercase(), name.to_lowercase())
}

/// Run one scan.
///
/// Reconciles the evidence, orders items as runtimes, then OS, then
/// packages (stable within each group), and evaluates every item. Empty
/// evidence yields an empty finding list, not an error; the only error is
/// an invalid configuration.
pub fn run(input: &ScanInput, config: &ScanConfig) -> Result<Vec<Finding>> {
    config.validate()?;
    let now = config.today();

    let mut items = reconcile(input.evidence.clone());
    // Stable sort: group order between kinds, reconciled order within.
    items.sort_by_key(|usage| usage.kind.group_order());
    debug!(items = items.len(), "evidence reconciled");

    let findings: Vec<Finding> = items
        .par_iter()
        .map(|usage| evaluate_item(usage, input, config, now))
        .collect();

    info!(
        findings = findings.len(),
        eol = findings.iter().filter(|f| f.status.is_eol()).count(),
        "scan complete"
    );
    Ok(findings)
}

/// Produce the single finding for one reconciled usage.
fn evaluate_item(
    usage: &TechnologyUsage,
    input: &ScanInput,
    config: &ScanConfig,
    now: NaiveDate,
) -> Finding {
    let mut finding = Finding::unknown(usage.kind, usage.name.clone(), usage.raw_version.clone());
    finding.ecosystem = usage.ecosystem.clone();

    match usage.kind {
        TechnologyKind::Runtime | TechnologyKind::OperatingSystem => {
            let classification = classify(usage, &input.dataset, config.near_months, now);
            finding.status = FindingStatus::Support(classification.status);
            finding.eol_date = classification.eol_date;
            finding.days_to_eol = classification.days_to_eol;
            finding.latest_version = classification.latest_version;
        }
        TechnologyKind::Package => {
            let release = usage
                .ecosystem
                .as_deref()
                .map(|eco| package_key(eco, &usage.name))
                .and_then(|key| input.releases.get(&key));
            let staleness = evaluate_staleness(
                release.and_then(|r| r.last_release_date),
                now,
                config.stale_months,
            );
            finding.status = FindingStatus::Staleness(staleness.status);
            finding.last_release_date = release.and_then(|r| r.last_release_date);
            finding.days_since_release = staleness.days_since_release;
            finding.latest_version = release.and_then(|r| r.latest_version.clone());
        }
    }

    if config.score_risk {
        attach_risk(&mut finding, usage, input, config);
    }
    finding
}

/// Baseline popularity for well-known registries; callers can override
/// per package through [`AuxSignals`].
fn ecosystem_popularity(ecosystem: &str) -> Option<f64> {
    match ecosystem {
        "PyPI" | "npm" => Some(0.9),
        "Maven" | "Go" => Some(0.8),
        "NuGet" | "Cargo" => Some(0.7),
        "RubyGems" => Some(0.6),
        _ => None,
    }
}

fn attach_risk(finding: &mut Finding, usage: &TechnologyUsage, input: &ScanInput, config: &ScanConfig) {
    let aux = usage
        .ecosystem
        .as_deref()
        .map(|eco| package_key(eco, &usage.name))
        .and_then(|key| input.signals.get(&key))
        .copied()
        .unwrap_or_default();

    let signals = RiskSignals {
        days_to_eol: finding.days_to_eol,
        days_since_release: finding.days_since_release,
        advisory_count: aux.advisory_count,
        ecosystem_popularity: aux.ecosystem_popularity.or_else(|| {
            usage
                .ecosystem
                .as_deref()
                .and_then(ecosystem_popularity)
        }),
    };

    if let Some(assessment) = score(&signals, &config.weights) {
        finding.risk_score = Some(assessment.risk_score);
        finding.risk_level = Some(assessment.risk_level);
        finding.confidence = Some(assessment.confidence);
        finding.features_used = assessment.features_used;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EvidenceSource, LifecycleCycle, RiskLevel, SupportStatus};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn config() -> ScanConfig {
        ScanConfig {
            today: Some(today()),
            ..ScanConfig::default()
        }
    }

    fn dataset() -> LifecycleTable {
        let mut table = LifecycleTable::new();
        table.insert(
            "python",
            vec![LifecycleCycle::new("3.9", Some(today() + Duration::days(80))).with_latest("3.12")],
        );
        table.insert(
            "ubuntu",
            vec![LifecycleCycle::new("18.04", Some(today() - Duration::days(820)))],
        );
        table
    }

    #[test]
    fn test_empty_input_is_empty_scan() {
        let findings = run(&ScanInput::default(), &config()).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_group_ordering_runtimes_os_packages() {
        let input = ScanInput {
            evidence: vec![
                TechnologyUsage::package(
                    "PyPI",
                    "requests",
                    Some("2.31.0".to_string()),
                    EvidenceSource::FileHeuristic,
                ),
                TechnologyUsage::operating_system(
                    "ubuntu",
                    "Ubuntu",
                    Some("18.04".to_string()),
                    EvidenceSource::FileHeuristic,
                ),
                TechnologyUsage::runtime(
                    "python",
                    "Python",
                    Some("3.9.7".to_string()),
                    EvidenceSource::RemoteSbom,
                ),
            ],
            dataset: dataset(),
            ..ScanInput::default()
        };
        let findings = run(&input, &config()).unwrap();
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].kind, TechnologyKind::Runtime);
        assert_eq!(findings[1].kind, TechnologyKind::OperatingSystem);
        assert_eq!(findings[2].kind, TechnologyKind::Package);
    }

    #[test]
    fn test_runtime_near_eol_finding() {
        let input = ScanInput {
            evidence: vec![TechnologyUsage::runtime(
                "python",
                "Python",
                Some("3.9.7".to_string()),
                EvidenceSource::RemoteSbom,
            )],
            dataset: dataset(),
            ..ScanInput::default()
        };
        let findings = run(&input, &config()).unwrap();
        assert_eq!(
            findings[0].status,
            FindingStatus::Support(SupportStatus::NearEol)
        );
        assert_eq!(findings[0].days_to_eol, Some(80));
        assert_eq!(findings[0].latest_version.as_deref(), Some("3.12"));
        assert!(findings[0].risk_score.is_some());
    }

    #[test]
    fn test_package_staleness_finding() {
        let last_release = today() - Duration::days(1100);
        let mut releases = HashMap::new();
        releases.insert(
            package_key("PyPI", "requests"),
            ReleaseInfo {
                last_release_date: Some(last_release),
                latest_version: Some("2.32.0".to_string()),
            },
        );
        let input = ScanInput {
            evidence: vec![TechnologyUsage::package(
                "PyPI",
                "requests",
                Some("2.31.0".to_string()),
                EvidenceSource::FileHeuristic,
            )],
            releases,
            ..ScanInput::default()
        };
        let findings = run(&input, &config()).unwrap();
        let finding = &findings[0];
        assert_eq!(
            finding.status,
            FindingStatus::Staleness(crate::model::StalenessStatus::PotentiallyUnmaintained)
        );
        assert_eq!(finding.days_since_release, Some(1100));
        assert_eq!(finding.last_release_date, Some(last_release));
        assert_eq!(finding.latest_version.as_deref(), Some("2.32.0"));
        assert!(finding
            .features_used
            .contains(&"days_since_release".to_string()));
    }

    #[test]
    fn test_unknown_item_still_produces_finding() {
        let input = ScanInput {
            evidence: vec![TechnologyUsage::runtime(
                "python",
                "Python",
                None,
                EvidenceSource::FileHeuristic,
            )],
            dataset: dataset(),
            ..ScanInput::default()
        };
        let findings = run(&input, &config()).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].status,
            FindingStatus::Support(SupportStatus::Unknown)
        );
        // No signals at all: no risk score, never a fabricated one.
        assert!(findings[0].risk_score.is_none());
    }

    #[test]
    fn test_no_risk_flag_suppresses_scores() {
        let mut cfg = config();
        cfg.score_risk = false;
        let input = ScanInput {
            evidence: vec![TechnologyUsage::operating_system(
                "ubuntu",
                "Ubuntu",
                Some("18.04".to_string()),
                EvidenceSource::FileHeuristic,
            )],
            dataset: dataset(),
            ..ScanInput::default()
        };
        let findings = run(&input, &cfg).unwrap();
        assert_eq!(
            findings[0].status,
            FindingStatus::Support(SupportStatus::Eol)
        );
        assert!(findings[0].risk_score.is_none());
        assert!(findings[0].risk_level.is_none());
    }

    #[test]
    fn test_eol_os_scores_critical() {
        let input = ScanInput {
            evidence: vec![TechnologyUsage::operating_system(
                "ubuntu",
                "Ubuntu",
                Some("18.04".to_string()),
                EvidenceSource::LocalSbomFile,
            )],
            dataset: dataset(),
            ..ScanInput::default()
        };
        let findings = run(&input, &config()).unwrap();
        assert_eq!(findings[0].days_to_eol, Some(-820));
        assert_eq!(findings[0].risk_level, Some(RiskLevel::Critical));
    }

    #[test]
    fn test_aux_signals_feed_scorer() {
        let mut signals = HashMap::new();
        signals.insert(
            package_key("npm", "left-pad"),
            AuxSignals {
                advisory_count: Some(3),
                ecosystem_popularity: None,
            },
        );
        let input = ScanInput {
            evidence: vec![TechnologyUsage::package(
                "npm",
                "left-pad",
                Some("1.3.0".to_string()),
                EvidenceSource::FileHeuristic,
            )],
            signals,
            ..ScanInput::default()
        };
        let findings = run(&input, &config()).unwrap();
        assert!(findings[0]
            .features_used
            .contains(&"advisory_count".to_string()));
        assert!(findings[0]
            .features_used
            .contains(&"ecosystem_popularity".to_string()));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let cfg = ScanConfig {
            near_months: 0,
            ..config()
        };
        assert!(run(&ScanInput::default(), &cfg).is_err());
    }
}
