//! Fetch collaborators: HTTP clients that retrieve lifecycle data, registry
//! metadata, and remote SBOM documents before the pipeline runs.
//!
//! The pipeline itself does no I/O; these clients run first and hand it
//! plain data. The whole module sits behind the `fetch` cargo feature.

mod cache;
mod eol_api;
mod github;
mod registry;

pub use cache::FileCache;
pub use eol_api::EolApiClient;
pub use github::GithubClient;
pub use registry::RegistryClient;
