//! End-to-end pipeline tests: evidence in, findings out.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use eolscan::config::{RiskWeights, ScanConfig};
use eolscan::model::{
    EvidenceSource, FindingStatus, LifecycleCycle, LifecycleTable, StalenessStatus, SupportStatus,
    TechnologyKind, TechnologyUsage,
};
use eolscan::pipeline::{package_key, run, ReleaseInfo, ScanInput};
use eolscan::risk::{score, RiskSignals};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn config() -> ScanConfig {
    ScanConfig {
        today: Some(today()),
        ..ScanConfig::default()
    }
}

fn python_dataset(eol: NaiveDate) -> LifecycleTable {
    let mut table = LifecycleTable::new();
    table.insert(
        "python",
        vec![LifecycleCycle::new("3.9", Some(eol)).with_latest("3.12")],
    );
    table
}

fn run_python(dataset: LifecycleTable) -> eolscan::model::Finding {
    let input = ScanInput {
        evidence: vec![TechnologyUsage::runtime(
            "python",
            "Python",
            Some("3.9.7".to_string()),
            EvidenceSource::RemoteSbom,
        )],
        dataset,
        ..ScanInput::default()
    };
    run(&input, &config()).unwrap().remove(0)
}

#[test]
fn near_eol_runtime_end_to_end() {
    let finding = run_python(python_dataset(today() + Duration::days(80)));
    assert_eq!(finding.status, FindingStatus::Support(SupportStatus::NearEol));
    assert_eq!(finding.days_to_eol, Some(80));
    assert_eq!(finding.latest_version.as_deref(), Some("3.12"));
}

#[test]
fn eol_date_on_scan_day_is_eol() {
    let finding = run_python(python_dataset(today()));
    assert_eq!(finding.status, FindingStatus::Support(SupportStatus::Eol));
    assert_eq!(finding.days_to_eol, Some(0));
}

#[test]
fn near_threshold_boundary_is_inclusive() {
    let at_threshold = run_python(python_dataset(today() + Duration::days(6 * 30)));
    assert_eq!(
        at_threshold.status,
        FindingStatus::Support(SupportStatus::NearEol)
    );

    let past_threshold = run_python(python_dataset(today() + Duration::days(6 * 30 + 1)));
    assert_eq!(
        past_threshold.status,
        FindingStatus::Support(SupportStatus::Supported)
    );
}

#[test]
fn eol_os_end_to_end() {
    let mut dataset = LifecycleTable::new();
    dataset.insert(
        "ubuntu",
        vec![LifecycleCycle::new(
            "18.04",
            Some(today() - Duration::days(820)),
        )],
    );
    let input = ScanInput {
        evidence: vec![TechnologyUsage::operating_system(
            "ubuntu",
            "Ubuntu",
            Some("18.04".to_string()),
            EvidenceSource::FileHeuristic,
        )],
        dataset,
        ..ScanInput::default()
    };
    let finding = run(&input, &config()).unwrap().remove(0);
    assert_eq!(finding.status, FindingStatus::Support(SupportStatus::Eol));
    assert_eq!(finding.days_to_eol, Some(-820));
}

#[test]
fn stale_package_end_to_end() {
    let mut releases = HashMap::new();
    releases.insert(
        package_key("PyPI", "requests"),
        ReleaseInfo {
            last_release_date: Some(today() - Duration::days(1100)),
            latest_version: None,
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
    let finding = run(&input, &config()).unwrap().remove(0);
    assert_eq!(
        finding.status,
        FindingStatus::Staleness(StalenessStatus::PotentiallyUnmaintained)
    );
    assert_eq!(finding.days_since_release, Some(1100));
}

#[test]
fn staleness_threshold_boundary() {
    for (days, expected) in [
        (24 * 30, StalenessStatus::PotentiallyUnmaintained),
        (24 * 30 - 1, StalenessStatus::Active),
    ] {
        let mut releases = HashMap::new();
        releases.insert(
            package_key("npm", "express"),
            ReleaseInfo {
                last_release_date: Some(today() - Duration::days(days)),
                latest_version: None,
            },
        );
        let input = ScanInput {
            evidence: vec![TechnologyUsage::package(
                "npm",
                "express",
                Some("4.18.2".to_string()),
                EvidenceSource::FileHeuristic,
            )],
            releases,
            ..ScanInput::default()
        };
        let finding = run(&input, &config()).unwrap().remove(0);
        assert_eq!(finding.status, FindingStatus::Staleness(expected));
    }
}

#[test]
fn precedence_remote_sbom_version_wins() {
    let input = ScanInput {
        evidence: vec![
            TechnologyUsage::runtime(
                "python",
                "Python",
                Some("3.8.0".to_string()),
                EvidenceSource::FileHeuristic,
            ),
            TechnologyUsage::runtime(
                "python",
                "Python",
                Some("3.8.5".to_string()),
                EvidenceSource::LocalSbomFile,
            ),
            TechnologyUsage::runtime(
                "python",
                "Python",
                Some("3.9.7".to_string()),
                EvidenceSource::RemoteSbom,
            ),
        ],
        dataset: python_dataset(today() + Duration::days(80)),
        ..ScanInput::default()
    };
    let findings = run(&input, &config()).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].version.as_deref(), Some("3.9.7"));
}

#[test]
fn missing_version_yields_unknown_without_failing_scan() {
    let input = ScanInput {
        evidence: vec![
            TechnologyUsage::runtime("python", "Python", None, EvidenceSource::FileHeuristic),
            TechnologyUsage::runtime(
                "python",
                "Python2",
                Some("3.9.7".to_string()),
                EvidenceSource::RemoteSbom,
            ),
        ],
        dataset: python_dataset(today() + Duration::days(400)),
        ..ScanInput::default()
    };
    let findings = run(&input, &config()).unwrap();
    assert_eq!(findings.len(), 2);
    assert_eq!(
        findings[0].status,
        FindingStatus::Support(SupportStatus::Unknown)
    );
    assert_eq!(
        findings[1].status,
        FindingStatus::Support(SupportStatus::Supported)
    );
}

#[test]
fn every_reconciled_item_produces_one_finding() {
    let input = ScanInput {
        evidence: vec![
            TechnologyUsage::runtime(
                "python",
                "Python",
                Some("3.9.7".to_string()),
                EvidenceSource::RemoteSbom,
            ),
            TechnologyUsage::operating_system(
                "ubuntu",
                "Ubuntu",
                Some("22.04".to_string()),
                EvidenceSource::FileHeuristic,
            ),
            TechnologyUsage::package(
                "PyPI",
                "requests",
                Some("2.31.0".to_string()),
                EvidenceSource::FileHeuristic,
            ),
            TechnologyUsage::package(
                "npm",
                "express",
                Some("4.18.2".to_string()),
                EvidenceSource::FileHeuristic,
            ),
        ],
        // Empty dataset and no registry data: everything lands on Unknown,
        // but nothing is dropped.
        ..ScanInput::default()
    };
    let findings = run(&input, &config()).unwrap();
    assert_eq!(findings.len(), 4);
    assert_eq!(findings[0].kind, TechnologyKind::Runtime);
    assert_eq!(findings[1].kind, TechnologyKind::OperatingSystem);
    assert_eq!(findings[2].kind, TechnologyKind::Package);
}

#[test]
fn wire_schema_field_names() {
    let finding = run_python(python_dataset(today() + Duration::days(80)));
    let json = serde_json::to_value(&finding).unwrap();
    let obj = json.as_object().unwrap();

    assert_eq!(obj["type"], "runtime");
    assert_eq!(obj["name"], "Python");
    assert_eq!(obj["version"], "3.9.7");
    assert_eq!(obj["status"], "Near EOL");
    assert_eq!(obj["days_to_eol"], 80);
    assert_eq!(obj["latest"], "3.12");
    assert!(obj.contains_key("risk_score"));
    assert!(obj.contains_key("risk_level"));
    assert!(obj.contains_key("confidence"));
    assert!(obj.contains_key("features_used"));
}

#[test]
fn findings_are_deterministic_across_runs() {
    let input = ScanInput {
        evidence: vec![
            TechnologyUsage::package(
                "npm",
                "express",
                Some("4.18.2".to_string()),
                EvidenceSource::FileHeuristic,
            ),
            TechnologyUsage::runtime(
                "python",
                "Python",
                Some("3.9.7".to_string()),
                EvidenceSource::RemoteSbom,
            ),
        ],
        dataset: python_dataset(today() + Duration::days(80)),
        ..ScanInput::default()
    };
    let first = run(&input, &config()).unwrap();
    let second = run(&input, &config()).unwrap();
    assert_eq!(first, second);
}

proptest! {
    // Decreasing days_to_eol never decreases the risk score.
    #[test]
    fn risk_monotonic_in_days_to_eol(a in -1000_i64..2000, b in -1000_i64..2000) {
        let (closer, farther) = (a.min(b), a.max(b));
        let weights = RiskWeights::default();
        let signals = |days| RiskSignals { days_to_eol: Some(days), ..RiskSignals::default() };
        let close_score = score(&signals(closer), &weights).unwrap().risk_score;
        let far_score = score(&signals(farther), &weights).unwrap().risk_score;
        prop_assert!(close_score >= far_score);
    }

    // Scores and confidence always stay inside [0, 1].
    #[test]
    fn risk_score_bounded(
        days_to_eol in proptest::option::of(-2000_i64..2000),
        days_since_release in proptest::option::of(0_i64..4000),
        advisories in proptest::option::of(0_u32..100),
        popularity in proptest::option::of(0.0_f64..=1.0),
    ) {
        let signals = RiskSignals {
            days_to_eol,
            days_since_release,
            advisory_count: advisories,
            ecosystem_popularity: popularity,
        };
        if let Some(assessment) = score(&signals, &RiskWeights::default()) {
            prop_assert!((0.0..=1.0).contains(&assessment.risk_score));
            prop_assert!((0.0..=1.0).contains(&assessment.confidence));
            prop_assert!(!assessment.features_used.is_empty());
        } else {
            prop_assert!(signals.is_empty());
        }
    }
}
