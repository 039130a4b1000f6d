//! Release-age staleness evaluation for packages.
//!
//! Packages have no canonical per-ecosystem EOL dataset, so they receive a
//! maintenance signal instead of a lifecycle status. This evaluator never
//! produces EOL or Near EOL labels.

use chrono::NaiveDate;

use crate::model::StalenessStatus;

/// Result of evaluating a package's release age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessResult {
    /// Maintenance signal
    pub status: StalenessStatus,
    /// Days since the last release, when a release date is known
    pub days_since_release: Option<i64>,
}

/// Evaluate a package's release-age maintenance signal.
///
/// No release date → `Unknown`. A last release `threshold_months * 30` or
/// more days ago → `PotentiallyUnmaintained`; anything newer → `Active`.
#[must_use]
pub fn evaluate_staleness(
    last_release_date: Option<NaiveDate>,
    now: NaiveDate,
    threshold_months: u32,
) -> StalenessResult {
    let Some(last_release) = last_release_date else {
        return StalenessResult {
            status: StalenessStatus::Unknown,
            days_since_release: None,
        };
    };

    let days_since_release = (now - last_release).num_days();
    let status = if days_since_release >= i64::from(threshold_months) * 30 {
        StalenessStatus::PotentiallyUnmaintained
    } else {
        StalenessStatus::Active
    };

    StalenessResult {
        status,
        days_since_release: Some(days_since_release),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_absent_release_date_is_unknown() {
        let result = evaluate_staleness(None, today(), 24);
        assert_eq!(result.status, StalenessStatus::Unknown);
        assert!(result.days_since_release.is_none());
    }

    #[test]
    fn test_threshold_boundary_is_unmaintained() {
        let last = today() - Duration::days(24 * 30);
        let result = evaluate_staleness(Some(last), today(), 24);
        assert_eq!(result.status, StalenessStatus::PotentiallyUnmaintained);
        assert_eq!(result.days_since_release, Some(720));
    }

    #[test]
    fn test_one_day_under_threshold_is_active() {
        let last = today() - Duration::days(24 * 30 - 1);
        let result = evaluate_staleness(Some(last), today(), 24);
        assert_eq!(result.status, StalenessStatus::Active);
        assert_eq!(result.days_since_release, Some(719));
    }

    #[test]
    fn test_recent_release_is_active() {
        let last = today() - Duration::days(14);
        let result = evaluate_staleness(Some(last), today(), 24);
        assert_eq!(result.status, StalenessStatus::Active);
    }

    #[test]
    fn test_custom_threshold() {
        let last = today() - Duration::days(200);
        assert_eq!(
            evaluate_staleness(Some(last), today(), 6).status,
            StalenessStatus::PotentiallyUnmaintained
        );
        assert_eq!(
            evaluate_staleness(Some(last), today(), 12).status,
            StalenessStatus::Active
        );
    }
}
