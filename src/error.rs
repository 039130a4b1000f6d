//! Unified error types for eolscan.
//!
//! Domain uncertainty (unresolvable versions, dataset misses, missing
//! evidence) never surfaces here; it degrades to an `Unknown` status inside
//! the pipeline. These errors cover structural problems only: unreadable
//! input documents, invalid configuration, and failed collaborator fetches.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for eolscan operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EolScanError {
    /// Errors while reading or parsing discovery inputs
    #[error("Failed to read evidence: {context}")]
    Discovery {
        context: String,
        #[source]
        source: DiscoveryErrorKind,
    },

    /// Errors while loading the lifecycle dataset
    #[error("Failed to load lifecycle dataset: {context}")]
    Dataset {
        context: String,
        #[source]
        source: DatasetErrorKind,
    },

    /// Errors from fetch collaborators (dataset/registry/SBOM downloads)
    #[error("Fetch failed: {context}")]
    Fetch {
        context: String,
        #[source]
        source: FetchErrorKind,
    },

    /// IO errors with path context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific discovery input error kinds.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DiscoveryErrorKind {
    #[error("Unknown SBOM format - expected SPDX JSON or CycloneDX JSON markers")]
    UnknownSbomFormat,

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

/// Specific dataset error kinds.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DatasetErrorKind {
    #[error("Invalid dataset JSON: {0}")]
    InvalidJson(String),

    #[error("Dataset file not found: {0}")]
    NotFound(String),
}

/// Specific fetch collaborator error kinds.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FetchErrorKind {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),
}

/// Convenient Result type for eolscan operations.
pub type Result<T> = std::result::Result<T, EolScanError>;

impl EolScanError {
    /// Create a discovery error with context.
    pub fn discovery(context: impl Into<String>, source: DiscoveryErrorKind) -> Self {
        Self::Discovery {
            context: context.into(),
            source,
        }
    }

    /// Create a discovery error for an unrecognized SBOM document.
    pub fn unknown_sbom_format(path: impl Into<String>) -> Self {
        Self::discovery(
            format!("at {}", path.into()),
            DiscoveryErrorKind::UnknownSbomFormat,
        )
    }

    /// Create a dataset error with context.
    pub fn dataset(context: impl Into<String>, source: DatasetErrorKind) -> Self {
        Self::Dataset {
            context: context.into(),
            source,
        }
    }

    /// Create a fetch error with context.
    pub fn fetch(context: impl Into<String>, source: FetchErrorKind) -> Self {
        Self::Fetch {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let message = format!("{source}");
        Self::Io {
            path: Some(path.into()),
            message,
            source,
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<std::io::Error> for EolScanError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for EolScanError {
    fn from(err: serde_json::Error) -> Self {
        Self::discovery(
            "JSON deserialization",
            DiscoveryErrorKind::InvalidJson(err.to_string()),
        )
    }
}
