//! Lifecycle classifier: technology usage + dataset → support status.

use chrono::NaiveDate;
use tracing::debug;

use crate::model::{LifecycleTable, SupportStatus, TechnologyUsage};

use super::normalizer::{canonical_family, normalize};

/// Result of classifying one usage against the lifecycle dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Computed support status
    pub status: SupportStatus,
    /// Scheduled EOL date, when the dataset has one
    pub eol_date: Option<NaiveDate>,
    /// Days until EOL relative to the scan date; negative means past
    pub days_to_eol: Option<i64>,
    /// Latest version in the family, passed through untouched
    pub latest_version: Option<String>,
}

impl Classification {
    fn unknown() -> Self {
        Self {
            status: SupportStatus::Unknown,
            eol_date: None,
            days_to_eol: None,
            latest_version: None,
        }
    }
}

/// Classify a technology usage against the lifecycle dataset.
///
/// Every lookup miss degrades to `Unknown`: absent version, unresolvable
/// version, family not in the dataset, or cycle not among the family's rows.
/// The `near_months` threshold is per-scan and applies uniformly to every
/// item; an EOL date on the scan day itself counts as EOL.
#[must_use]
pub fn classify(
    usage: &TechnologyUsage,
    dataset: &LifecycleTable,
    near_months: u32,
    now: NaiveDate,
) -> Classification {
    let Some(raw_version) = usage.raw_version.as_deref() else {
        debug!(name = %usage.name, "no version evidence, classifying as Unknown");
        return Classification::unknown();
    };

    let family = canonical_family(&usage.family);

    let Ok(cycle_key) = normalize(&family, raw_version) else {
        debug!(name = %usage.name, version = raw_version, "unresolvable version");
        return Classification::unknown();
    };

    if dataset.family(&family).is_none() {
        debug!(family = %family, "family not in lifecycle dataset");
        return Classification::unknown();
    }

    // Cycle keys are inexact across families: Node.js keys by major ("18")
    // while Python keys by major.minor ("3.9"). Try the normalized key
    // first, then fall back to the bare major.
    let fallback_major = cycle_key.split('.').next().map(str::to_string);
    let cycle = dataset.cycle(&family, &cycle_key).or_else(|| {
        fallback_major
            .as_deref()
            .filter(|major| *major != cycle_key)
            .and_then(|major| dataset.cycle(&family, major))
    });
    let Some(cycle) = cycle else {
        debug!(family = %family, cycle = %cycle_key, "cycle not in dataset");
        return Classification::unknown();
    };

    let latest_version = cycle
        .latest
        .clone()
        .or_else(|| dataset.latest_version(&family).map(str::to_string));

    // A bare `eol: true` means the cycle is retired even without a date.
    if cycle.eol.as_ref().is_some_and(|e| e.is_flagged_reached()) {
        return Classification {
            status: SupportStatus::Eol,
            eol_date: None,
            days_to_eol: None,
            latest_version,
        };
    }

    let Some(eol_date) = cycle.eol_date() else {
        // No EOL scheduled: supported indefinitely.
        return Classification {
            status: SupportStatus::Supported,
            eol_date: None,
            days_to_eol: None,
            latest_version,
        };
    };

    let days_to_eol = (eol_date - now).num_days();
    let status = if days_to_eol <= 0 {
        // "Today is end of support" means support has ended.
        SupportStatus::Eol
    } else if days_to_eol <= i64::from(near_months) * 30 {
        SupportStatus::NearEol
    } else {
        SupportStatus::Supported
    };

    Classification {
        status,
        eol_date: Some(eol_date),
        days_to_eol: Some(days_to_eol),
        latest_version,
    }
}
