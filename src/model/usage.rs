//! Technology-usage evidence records produced by discovery.

use serde::{Deserialize, Serialize};

/// What category of technology a piece of evidence describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechnologyKind {
    /// Language runtime (Python, Node.js, ...)
    Runtime,
    /// Base operating system image (Ubuntu, Alpine, ...)
    #[serde(rename = "os")]
    OperatingSystem,
    /// Third-party package from an ecosystem registry
    Package,
}

impl TechnologyKind {
    /// Output group ordering: runtimes, then OS, then packages.
    #[must_use]
    pub const fn group_order(self) -> u8 {
        match self {
            Self::Runtime => 0,
            Self::OperatingSystem => 1,
            Self::Package => 2,
        }
    }

    /// The stable wire name used in the `type` field of findings.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::OperatingSystem => "os",
            Self::Package => "package",
        }
    }
}

/// Where a piece of evidence came from.
///
/// Sources form a strict precedence order used during reconciliation:
/// remote SBOM beats a locally supplied SBOM file, which beats heuristic
/// file parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    /// SBOM fetched from a remote service (e.g., the GitHub dependency graph)
    RemoteSbom,
    /// SBOM file supplied by the caller on disk
    LocalSbomFile,
    /// Version pin scraped from project files (Dockerfile, .nvmrc, ...)
    FileHeuristic,
}

impl EvidenceSource {
    /// Ordinal confidence; higher wins reconciliation.
    #[must_use]
    pub const fn confidence(self) -> u8 {
        match self {
            Self::RemoteSbom => 3,
            Self::LocalSbomFile => 2,
            Self::FileHeuristic => 1,
        }
    }
}

/// One detected technology instance, before reconciliation.
///
/// Multiple usages for the same (kind, family, name) may exist in a raw
/// evidence list; at most one survives reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyUsage {
    /// Technology category
    pub kind: TechnologyKind,
    /// Lifecycle-dataset family slug (e.g., "python", "nodejs", "ubuntu")
    pub family: String,
    /// Registry ecosystem, set only for packages (e.g., "PyPI", "npm")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosystem: Option<String>,
    /// Display name (e.g., "Python", "Node.js", "requests")
    pub name: String,
    /// Exact version string found in evidence, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_version: Option<String>,
    /// Provenance of this evidence
    pub source: EvidenceSource,
}

impl TechnologyUsage {
    /// Evidence for a runtime.
    #[must_use]
    pub fn runtime(
        family: impl Into<String>,
        name: impl Into<String>,
        version: Option<String>,
        source: EvidenceSource,
    ) -> Self {
        Self {
            kind: TechnologyKind::Runtime,
            family: family.into(),
            ecosystem: None,
            name: name.into(),
            raw_version: version,
            source,
        }
    }

    /// Evidence for a base operating system.
    #[must_use]
    pub fn operating_system(
        family: impl Into<String>,
        name: impl Into<String>,
        version: Option<String>,
        source: EvidenceSource,
    ) -> Self {
        Self {
            kind: TechnologyKind::OperatingSystem,
            family: family.into(),
            ecosystem: None,
            name: name.into(),
            raw_version: version,
            source,
        }
    }

    /// Evidence for an ecosystem package.
    #[must_use]
    pub fn package(
        ecosystem: impl Into<String>,
        name: impl Into<String>,
        version: Option<String>,
        source: EvidenceSource,
    ) -> Self {
        let name = name.into();
        Self {
            kind: TechnologyKind::Package,
            family: name.clone(),
            ecosystem: Some(ecosystem.into()),
            name,
            raw_version: version,
            source,
        }
    }

    /// Ordinal confidence derived from the evidence source.
    #[must_use]
    pub const fn confidence(&self) -> u8 {
        self.source.confidence()
    }

    /// Grouping key for reconciliation.
    #[must_use]
    pub fn identity(&self) -> (TechnologyKind, &str, &str) {
        (self.kind, self.family.as_str(), self.name.as_str())
    }
}
