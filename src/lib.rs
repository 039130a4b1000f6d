//! **End-of-life and end-of-support exposure scanning for software projects.**
//!
//! `eolscan` finds the language runtimes, base operating-system images, and
//! third-party packages a project uses, matches them against lifecycle data
//! from `endoflife.date` and registry release history, and reports which of
//! them are end-of-life, approaching end-of-life, or potentially
//! unmaintained — with an optional risk score per finding.
//!
//! ## How a scan works
//!
//! 1. **Discovery** gathers evidence from up to three sources: a remote
//!    SBOM (GitHub dependency graph), a locally supplied SBOM file (SPDX or
//!    CycloneDX JSON), and heuristic project-file parsing (`Dockerfile`,
//!    `.python-version`, `.nvmrc`, `package.json`, `requirements.txt`).
//! 2. The **reconciler** merges all evidence into one deduplicated set,
//!    applying strict source precedence (remote SBOM beats local SBOM beats
//!    file heuristics).
//! 3. The **classifier** normalizes each version into a dataset cycle key
//!    and computes a support status against the lifecycle dataset; packages
//!    instead receive a release-age staleness signal.
//! 4. The **risk scorer** combines whatever signals are available into a
//!    normalized score, level band, and confidence value.
//!
//! Domain uncertainty never aborts a scan: an unresolvable version, a
//! dataset miss, or missing registry data degrades that one item to an
//! `Unknown` status while the rest of the scan proceeds.
//!
//! ## Example
//!
//! ```no_run
//! use eolscan::config::ScanConfig;
//! use eolscan::discovery::scan_project_files;
//! use eolscan::pipeline::{run, ScanInput};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let input = ScanInput {
//!         evidence: scan_project_files(std::path::Path::new(".")),
//!         ..ScanInput::default()
//!     };
//!     let findings = run(&input, &ScanConfig::default())?;
//!     for finding in &findings {
//!         println!("{} {} -> {}", finding.name,
//!             finding.version.as_deref().unwrap_or("?"), finding.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature flags
//!
//! - `fetch` (default): enables the HTTP collaborators that download
//!   lifecycle data, registry metadata, and remote SBOMs. Without it the
//!   library is pure computation over caller-supplied data.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Cast safety: i64/u32→f64 casts in scoring math are bounded in practice
    clippy::cast_precision_loss,
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod model;
pub mod pipeline;
pub mod reports;
pub mod risk;

pub use config::{RiskWeights, ScanConfig};
pub use error::{EolScanError, Result};
pub use model::{
    EvidenceSource, Finding, FindingStatus, LifecycleCycle, LifecycleTable, RiskLevel,
    StalenessStatus, SupportStatus, TechnologyKind, TechnologyUsage,
};
pub use pipeline::{run, ScanInput};
pub use reports::{summarize, ScanSummary};
