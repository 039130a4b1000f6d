//! Heuristic project-file discovery.
//!
//! Scrapes version pins from conventional files: version-manager pin files,
//! Dockerfiles, project manifests, and dependency lists. All evidence is
//! tagged [`EvidenceSource::FileHeuristic`], the lowest precedence tier.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::classify::{canonical_family, family_display_name};
use crate::model::{EvidenceSource, TechnologyUsage};

/// Scan a project directory for technology evidence.
///
/// Missing or unreadable files contribute no candidates; a directory with
/// nothing recognizable yields an empty list, never an error.
#[must_use]
pub fn scan_project_files(root: &Path) -> Vec<TechnologyUsage> {
    let mut evidence = Vec::new();

    if let Some(version) = find_python_version(root) {
        evidence.push(TechnologyUsage::runtime(
            "python",
            family_display_name("python"),
            Some(version),
            EvidenceSource::FileHeuristic,
        ));
    }

    if let Some(version) = find_node_version(root) {
        evidence.push(TechnologyUsage::runtime(
            "nodejs",
            family_display_name("nodejs"),
            Some(version),
            EvidenceSource::FileHeuristic,
        ));
    }

    if let Some((family, version)) = find_os_from_dockerfile(root) {
        evidence.push(TechnologyUsage::operating_system(
            family.clone(),
            family_display_name(&family),
            Some(version),
            EvidenceSource::FileHeuristic,
        ));
    }

    evidence.extend(find_pypi_packages(root));
    evidence.extend(find_npm_packages(root));

    debug!(root = %root.display(), count = evidence.len(), "file heuristics complete");
    evidence
}

fn read_text(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

fn dockerfile_from_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^\s*FROM\s+(?:--platform=\S+\s+)?([a-z0-9.\-]+):([\w.\-]+)")
            .expect("dockerfile regex is valid")
    })
}

/// Python version: `.python-version`, then `Dockerfile FROM python:`,
/// then `pyproject.toml` requires-python.
fn find_python_version(root: &Path) -> Option<String> {
    if let Some(text) = read_text(&root.join(".python-version")) {
        let pin = text.trim();
        if !pin.is_empty() {
            return Some(pin.to_string());
        }
    }

    if let Some(dockerfile) = read_text(&root.join("Dockerfile")) {
        for caps in dockerfile_from_regex().captures_iter(&dockerfile) {
            if caps[1].eq_ignore_ascii_case("python") {
                if let Some(version) = leading_version(&caps[2]) {
                    return Some(version);
                }
            }
        }
    }

    if let Some(pyproject) = read_text(&root.join("pyproject.toml")) {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(r#"(?m)^\s*(?:python|requires-python)\s*=\s*"[^\d]*(\d+(?:\.\d+)*)"#)
                .expect("pyproject regex is valid")
        });
        if let Some(caps) = re.captures(&pyproject) {
            return Some(caps[1].to_string());
        }
    }

    None
}

/// Node version: `.nvmrc` / `.node-version`, then `Dockerfile FROM node:`,
/// then `package.json` engines.node.
fn find_node_version(root: &Path) -> Option<String> {
    for pin_file in [".nvmrc", ".node-version"] {
        if let Some(text) = read_text(&root.join(pin_file)) {
            let pin = text.trim().trim_start_matches('v');
            if !pin.is_empty() {
                return Some(pin.to_string());
            }
        }
    }

    if let Some(dockerfile) = read_text(&root.join("Dockerfile")) {
        for caps in dockerfile_from_regex().captures_iter(&dockerfile) {
            if caps[1].eq_ignore_ascii_case("node") {
                if let Some(version) = leading_version(&caps[2]) {
                    return Some(version);
                }
            }
        }
    }

    if let Some(pkg_json) = read_text(&root.join("package.json")) {
        let data: Value = serde_json::from_str(&pkg_json).ok()?;
        let engine = data.get("engines")?.get("node")?.as_str()?;
        return leading_version(engine);
    }

    None
}

/// Base OS from a `Dockerfile FROM` line, mapped to a canonical family slug.
fn find_os_from_dockerfile(root: &Path) -> Option<(String, String)> {
    let dockerfile = read_text(&root.join("Dockerfile"))?;
    static OS_NAMES: &[&str] = &[
        "ubuntu",
        "debian",
        "alpine",
        "centos",
        "rockylinux",
        "almalinux",
        "rhel",
    ];
    for caps in dockerfile_from_regex().captures_iter(&dockerfile) {
        let image = caps[1].to_lowercase();
        if OS_NAMES.contains(&image.as_str()) {
            return Some((canonical_family(&image), caps[2].to_string()));
        }
    }
    None
}

/// Extract the leading dotted version from a constraint like ">=18.0".
fn leading_version(text: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE
        .get_or_init(|| Regex::new(r"(\d+(?:\.\d+)*)").expect("leading version regex is valid"));
    re.captures(text).map(|caps| caps[1].to_string())
}

/// Pinned PyPI packages from `requirements.txt` (`name==version` lines).
fn find_pypi_packages(root: &Path) -> Vec<TechnologyUsage> {
    let Some(requirements) = read_text(&root.join("requirements.txt")) else {
        return Vec::new();
    };

    requirements
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let (name, version) = line.split_once("==")?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            // Strip environment markers and comments from the pin.
            let version = version
                .split(|c| c == ';' || c == '#' || c == ' ')
                .next()
                .unwrap_or("")
                .trim();
            Some(TechnologyUsage::package(
                "PyPI",
                name,
                (!version.is_empty()).then(|| version.to_string()),
                EvidenceSource::FileHeuristic,
            ))
        })
        .collect()
}

/// npm dependencies from `package.json` (`dependencies` only; dev
/// dependencies do not ship).
fn find_npm_packages(root: &Path) -> Vec<TechnologyUsage> {
    let Some(pkg_json) = read_text(&root.join("package.json")) else {
        return Vec::new();
    };
    let Ok(data) = serde_json::from_str::<Value>(&pkg_json) else {
        return Vec::new();
    };
    let Some(deps) = data.get("dependencies").and_then(Value::as_object) else {
        return Vec::new();
    };

    deps.iter()
        .map(|(name, constraint)| {
            let version = constraint.as_str().and_then(leading_version);
            TechnologyUsage::package("npm", name, version, EvidenceSource::FileHeuristic)
        })
        .collect()
}
