//! Discovery reconciliation: merge evidence from all sources into one
//! deduplicated technology-usage set with an explicit precedence relation.
//!
//! This is the only place source precedence is applied. Once an item has
//! been accepted from a higher-confidence source, lower-confidence evidence
//! for the same identity is dropped whole, never merged field by field.

use indexmap::IndexMap;
use tracing::debug;

use crate::model::{TechnologyKind, TechnologyUsage};

/// Reduce an ordered evidence list to at most one usage per
/// (kind, family, name).
///
/// Winner selection within a group: highest source confidence; on a tie the
/// entry with a populated `raw_version`; on a full tie the first
/// encountered. Group order follows first appearance in the input, so the
/// output is deterministic for a stable evidence order and the operation is
/// idempotent.
#[must_use]
pub fn reconcile(evidence: Vec<TechnologyUsage>) -> Vec<TechnologyUsage> {
    let mut groups: IndexMap<(TechnologyKind, String, String), TechnologyUsage> =
        IndexMap::new();

    for candidate in evidence {
        let key = (
            candidate.kind,
            candidate.family.clone(),
            candidate.name.clone(),
        );
        match groups.get_mut(&key) {
            None => {
                groups.insert(key, candidate);
            }
            Some(current) => {
                if supersedes(&candidate, current) {
                    debug!(
                        name = %candidate.name,
                        winner = ?candidate.source,
                        loser = ?current.source,
                        "evidence superseded by higher-precedence source"
                    );
                    *current = candidate;
                }
            }
        }
    }

    groups.into_values().collect()
}

/// Whether `candidate` replaces the currently held entry for its group.
fn supersedes(candidate: &TechnologyUsage, current: &TechnologyUsage) -> bool {
    if candidate.confidence() != current.confidence() {
        return candidate.confidence() > current.confidence();
    }
    // Same confidence: a populated version beats an absent one. On a full
    // tie the earlier entry stays.
    candidate.raw_version.is_some() && current.raw_version.is_none()
}
