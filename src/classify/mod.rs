//! Lifecycle classification: version normalization, dataset matching, and
//! release-age staleness evaluation.

mod classifier;
mod normalizer;
mod staleness;

pub use classifier::{classify, Classification};
pub use normalizer::{canonical_family, family_display_name, normalize, CycleRule, Unresolvable};
pub use staleness::{evaluate_staleness, StalenessResult};
