//! Core data model: evidence records, lifecycle dataset rows, and findings.
//!
//! Evidence flows in as [`TechnologyUsage`] records, is matched against a
//! [`LifecycleTable`], and leaves the pipeline as [`Finding`] records whose
//! serialized field names form the public report schema.

mod finding;
mod lifecycle;
mod usage;

pub use finding::{
    Finding, FindingStatus, RiskLevel, StalenessStatus, SupportStatus,
};
pub use lifecycle::{DateOrBool, LifecycleCycle, LifecycleTable};
pub use usage::{EvidenceSource, TechnologyKind, TechnologyUsage};
