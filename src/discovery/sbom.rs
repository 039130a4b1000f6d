//! SBOM document parsing into technology-usage evidence.
//!
//! Accepts SPDX JSON and CycloneDX JSON with automatic format detection.
//! Components whose names match a known runtime or OS family become
//! runtime/OS evidence; everything else is ignored here (package staleness
//! evidence comes from project files, where pinned versions live).

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::classify::family_display_name;
use crate::error::{DiscoveryErrorKind, EolScanError, Result};
use crate::model::{TechnologyKind, TechnologyUsage};

/// One raw component extracted from an SBOM document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbomComponent {
    /// Component name as recorded in the document
    pub name: String,
    /// Version string, empty string treated as absent
    pub version: Option<String>,
}

/// Family patterns recognized among SBOM component names.
///
/// Order matters: the first matching pattern wins.
fn family_patterns() -> &'static [(TechnologyKind, &'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(TechnologyKind, &'static str, Regex)>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            let table: &[(TechnologyKind, &str, &str)] = &[
                (TechnologyKind::Runtime, "python", r"(?i)^(python|cpython)$"),
                (TechnologyKind::Runtime, "nodejs", r"(?i)^(node|node\.?js|nodejs)$"),
                (TechnologyKind::Runtime, "go", r"(?i)^(go|golang)$"),
                (TechnologyKind::Runtime, "ruby", r"(?i)^ruby$"),
                (TechnologyKind::Runtime, "java", r"(?i)^(java|openjdk|jdk)$"),
                (TechnologyKind::Runtime, "dotnet", r"(?i)^(dotnet|\.net)$"),
                (TechnologyKind::OperatingSystem, "ubuntu", r"(?i)\bubuntu\b"),
                (TechnologyKind::OperatingSystem, "debian", r"(?i)\bdebian\b"),
                (TechnologyKind::OperatingSystem, "alpine", r"(?i)\balpine\b"),
                (
                    TechnologyKind::OperatingSystem,
                    "rocky-linux",
                    r"(?i)\b(rockylinux|rocky)\b",
                ),
                (
                    TechnologyKind::OperatingSystem,
                    "rhel",
                    r"(?i)\brhel\b|\bred hat\b",
                ),
                (TechnologyKind::OperatingSystem, "centos", r"(?i)\bcentos\b"),
            ];
            table
                .iter()
                .map(|(kind, slug, pattern)| {
                    (
                        *kind,
                        *slug,
                        Regex::new(pattern).expect("family pattern is valid"),
                    )
                })
                .collect()
        })
        .as_slice()
}

/// Parse an SBOM document and extract runtime/OS evidence.
///
/// `source` tags the provenance (remote vs. locally supplied file); the
/// caller decides which it is. A document that is valid JSON but neither
/// SPDX nor CycloneDX is a structural error.
pub fn parse_sbom_document(
    content: &str,
    source: crate::model::EvidenceSource,
) -> Result<Vec<TechnologyUsage>> {
    let components = extract_components(content)?;
    debug!(count = components.len(), "extracted SBOM components");
    Ok(runtime_hits(&components, source))
}

/// Extract name/version components from SPDX JSON or CycloneDX JSON.
fn extract_components(content: &str) -> Result<Vec<SbomComponent>> {
    let data: Value = serde_json::from_str(content)?;

    // SPDX JSON: top-level "spdxVersion" with a "packages" array.
    if data.get("spdxVersion").is_some()
        || data
            .get("$schema")
            .and_then(Value::as_str)
            .is_some_and(|s| s.contains("spdx"))
    {
        let packages = data
            .get("packages")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        return Ok(packages
            .iter()
            .filter_map(|pkg| {
                let name = pkg.get("name")?.as_str()?.to_string();
                let version = pkg
                    .get("versionInfo")
                    .or_else(|| pkg.get("version"))
                    .and_then(Value::as_str)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string);
                Some(SbomComponent { name, version })
            })
            .collect());
    }

    // CycloneDX JSON: "bomFormat": "CycloneDX" with a "components" array.
    if data
        .get("bomFormat")
        .and_then(Value::as_str)
        .is_some_and(|f| f.eq_ignore_ascii_case("cyclonedx"))
    {
        let components = data
            .get("components")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        return Ok(components
            .iter()
            .filter_map(|c| {
                let name = c.get("name")?.as_str()?.to_string();
                let version = c
                    .get("version")
                    .and_then(Value::as_str)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string);
                Some(SbomComponent { name, version })
            })
            .collect());
    }

    Err(EolScanError::discovery(
        "document is neither SPDX JSON nor CycloneDX JSON",
        DiscoveryErrorKind::UnknownSbomFormat,
    ))
}

/// Match components against the runtime/OS family table.
fn runtime_hits(
    components: &[SbomComponent],
    source: crate::model::EvidenceSource,
) -> Vec<TechnologyUsage> {
    let mut hits = Vec::new();
    for component in components {
        let name = component.name.trim();
        if name.is_empty() {
            continue;
        }
        for (kind, slug, pattern) in family_patterns() {
            if pattern.is_match(name) {
                let display = family_display_name(slug);
                let usage = match kind {
                    TechnologyKind::Runtime => TechnologyUsage::runtime(
                        *slug,
                        display,
                        component.version.clone(),
                        source,
                    ),
                    TechnologyKind::OperatingSystem => TechnologyUsage::operating_system(
                        *slug,
                        display,
                        component.version.clone(),
                        source,
                    ),
                    TechnologyKind::Package => continue,
                };
                hits.push(usage);
                break;
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EvidenceSource;

    const SPDX_DOC: &str = r#"{
        "spdxVersion": "SPDX-2.3",
        "packages": [
            {"name": "python", "versionInfo": "3.9.7"},
            {"name": "requests", "versionInfo": "2.31.0"},
            {"name": "ubuntu", "versionInfo": "22.04"}
        ]
    }"#;

    const CDX_DOC: &str = r#"{
        "bomFormat": "CycloneDX",
        "specVersion": "1.5",
        "components": [
            {"name": "node.js", "version": "18.19.0"},
            {"name": "express", "version": "4.18.2"}
        ]
    }"#;

    #[test]
    fn test_spdx_runtime_and_os_extraction() {
        let usages = parse_sbom_document(SPDX_DOC, EvidenceSource::RemoteSbom).unwrap();
        assert_eq!(usages.len(), 2);
        assert_eq!(usages[0].family, "python");
        assert_eq!(usages[0].kind, TechnologyKind::Runtime);
        assert_eq!(usages[0].raw_version.as_deref(), Some("3.9.7"));
        assert_eq!(usages[1].family, "ubuntu");
        assert_eq!(usages[1].kind, TechnologyKind::OperatingSystem);
    }

    #[test]
    fn test_cyclonedx_extraction() {
        let usages = parse_sbom_document(CDX_DOC, EvidenceSource::LocalSbomFile).unwrap();
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].family, "nodejs");
        assert_eq!(usages[0].name, "Node.js");
        assert_eq!(usages[0].source, EvidenceSource::LocalSbomFile);
    }

    #[test]
    fn test_unknown_format_is_error() {
        let err = parse_sbom_document("{\"foo\": 1}", EvidenceSource::LocalSbomFile);
        assert!(err.is_err());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(parse_sbom_document("not json", EvidenceSource::LocalSbomFile).is_err());
    }

    #[test]
    fn test_empty_version_becomes_absent() {
        let doc = r#"{
            "spdxVersion": "SPDX-2.3",
            "packages": [{"name": "python", "versionInfo": ""}]
        }"#;
        let usages = parse_sbom_document(doc, EvidenceSource::RemoteSbom).unwrap();
        assert_eq!(usages.len(), 1);
        assert!(usages[0].raw_version.is_none());
    }

    #[test]
    fn test_library_named_like_runtime_prefix_not_matched() {
        let doc = r#"{
            "bomFormat": "CycloneDX",
            "components": [{"name": "python-dateutil", "version": "2.8.2"}]
        }"#;
        let usages = parse_sbom_document(doc, EvidenceSource::LocalSbomFile).unwrap();
        assert!(usages.is_empty());
    }
}
