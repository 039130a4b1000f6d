//! Evidence discovery: SBOM parsing, project-file heuristics, and the
//! reconciler that merges all discovery sources into one deduplicated set.

mod files;
mod reconciler;
mod sbom;

pub use files::scan_project_files;
pub use reconciler::reconcile;
pub use sbom::{parse_sbom_document, SbomComponent};
