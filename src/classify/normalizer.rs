//! Version normalization: raw version strings → lifecycle cycle keys.
//!
//! Each family carries a cycle rule describing how much of the version
//! becomes the dataset lookup key. Rules are data, not code: adding a family
//! means adding a table row, and classification logic never branches on
//! family names.

use std::sync::OnceLock;

use regex::Regex;

/// How a family's version strings map to dataset cycle keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleRule {
    /// Keep major.minor ("3.9.7" → "3.9"); a bare major stays as-is
    /// (Debian "11" → "11"). Runtimes and most OS families.
    MajorMinor,
    /// Keep major only ("8.6" → "8"). RHEL-family OS releases.
    MajorOnly,
}

/// One family record: dataset slug, accepted aliases, display name, rule.
struct FamilyRule {
    slug: &'static str,
    aliases: &'static [&'static str],
    display_name: &'static str,
    rule: CycleRule,
}

/// The family table. Slugs are endoflife.date product identifiers.
static FAMILIES: &[FamilyRule] = &[
    // Runtimes
    FamilyRule { slug: "python", aliases: &["cpython"], display_name: "Python", rule: CycleRule::MajorMinor },
    FamilyRule { slug: "nodejs", aliases: &["node", "node.js"], display_name: "Node.js", rule: CycleRule::MajorMinor },
    FamilyRule { slug: "java", aliases: &["openjdk", "jdk"], display_name: "Java", rule: CycleRule::MajorMinor },
    FamilyRule { slug: "go", aliases: &["golang"], display_name: "Go", rule: CycleRule::MajorMinor },
    FamilyRule { slug: "dotnet", aliases: &[".net"], display_name: ".NET", rule: CycleRule::MajorMinor },
    FamilyRule { slug: "ruby", aliases: &[], display_name: "Ruby", rule: CycleRule::MajorMinor },
    FamilyRule { slug: "php", aliases: &[], display_name: "PHP", rule: CycleRule::MajorMinor },
    FamilyRule { slug: "rust", aliases: &["rustc"], display_name: "Rust", rule: CycleRule::MajorMinor },
    // Operating systems
    FamilyRule { slug: "ubuntu", aliases: &[], display_name: "Ubuntu", rule: CycleRule::MajorMinor },
    FamilyRule { slug: "debian", aliases: &[], display_name: "Debian", rule: CycleRule::MajorMinor },
    FamilyRule { slug: "alpine", aliases: &[], display_name: "Alpine", rule: CycleRule::MajorMinor },
    FamilyRule { slug: "rhel", aliases: &["redhat", "red hat"], display_name: "RHEL", rule: CycleRule::MajorOnly },
    FamilyRule { slug: "centos", aliases: &[], display_name: "CentOS", rule: CycleRule::MajorOnly },
    FamilyRule { slug: "rocky-linux", aliases: &["rocky", "rockylinux"], display_name: "Rocky Linux", rule: CycleRule::MajorOnly },
    FamilyRule { slug: "almalinux", aliases: &["alma"], display_name: "AlmaLinux", rule: CycleRule::MajorOnly },
    FamilyRule { slug: "oracle-linux", aliases: &["oraclelinux"], display_name: "Oracle Linux", rule: CycleRule::MajorOnly },
];

/// Marker for version strings that do not match the family's grammar.
///
/// Propagates to an `Unknown` classification rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unresolvable;

fn lookup(family: &str) -> Option<&'static FamilyRule> {
    let lower = family.to_lowercase();
    FAMILIES
        .iter()
        .find(|f| f.slug == lower || f.aliases.contains(&lower.as_str()))
}

/// Resolve a family name or alias to its canonical dataset slug.
///
/// Unknown families pass through lowercased so dataset lookups can still be
/// attempted (and miss gracefully).
#[must_use]
pub fn canonical_family(family: &str) -> String {
    lookup(family).map_or_else(|| family.to_lowercase(), |f| f.slug.to_string())
}

/// Human-readable display name for a family slug.
#[must_use]
pub fn family_display_name(family: &str) -> String {
    lookup(family).map_or_else(
        || {
            let mut chars = family.chars();
            chars.next().map_or_else(String::new, |c| {
                c.to_uppercase().collect::<String>() + chars.as_str()
            })
        },
        |f| f.display_name.to_string(),
    )
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Leading "v" tolerated; capture up to three dotted numeric components.
    RE.get_or_init(|| {
        Regex::new(r"^v?(\d+)(?:\.(\d+))?(?:\.\d+)*").expect("version regex is valid")
    })
}

/// Canonicalize a raw version string into the family's cycle key.
///
/// Runtimes truncate to major.minor ("3.9.7" → "3.9"); RHEL-family OS
/// versions keep the major only ("8.6" → "8"). Strings that do not start
/// with a numeric version ("latest", "stable", "") are [`Unresolvable`].
pub fn normalize(family: &str, raw_version: &str) -> Result<String, Unresolvable> {
    let trimmed = raw_version.trim();
    let captures = version_regex().captures(trimmed).ok_or(Unresolvable)?;

    let major = captures.get(1).ok_or(Unresolvable)?.as_str();
    let minor = captures.get(2).map(|m| m.as_str());

    let rule = lookup(family).map_or(CycleRule::MajorMinor, |f| f.rule);
    let key = match (rule, minor) {
        (CycleRule::MajorOnly, _) | (CycleRule::MajorMinor, None) => major.to_string(),
        (CycleRule::MajorMinor, Some(minor)) => format!("{major}.{minor}"),
    };
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_truncates_to_major_minor() {
        assert_eq!(normalize("python", "3.9.7"), Ok("3.9".to_string()));
        assert_eq!(normalize("nodejs", "18.19.0"), Ok("18.19".to_string()));
        assert_eq!(normalize("nodejs", "v18.19.0"), Ok("18.19".to_string()));
    }

    #[test]
    fn test_os_rules_differ_per_family() {
        assert_eq!(normalize("ubuntu", "22.04"), Ok("22.04".to_string()));
        assert_eq!(normalize("ubuntu", "22.04.3"), Ok("22.04".to_string()));
        assert_eq!(normalize("debian", "11"), Ok("11".to_string()));
        assert_eq!(normalize("alpine", "3.18.4"), Ok("3.18".to_string()));
        assert_eq!(normalize("rhel", "8.6"), Ok("8".to_string()));
        assert_eq!(normalize("rocky", "9.2"), Ok("9".to_string()));
    }

    #[test]
    fn test_unparseable_is_unresolvable() {
        assert_eq!(normalize("python", "latest"), Err(Unresolvable));
        assert_eq!(normalize("ubuntu", "jammy"), Err(Unresolvable));
        assert_eq!(normalize("python", ""), Err(Unresolvable));
    }

    #[test]
    fn test_unknown_family_defaults_to_major_minor() {
        assert_eq!(normalize("erlang", "26.1.2"), Ok("26.1".to_string()));
    }

    #[test]
    fn test_canonical_family_aliases() {
        assert_eq!(canonical_family("node"), "nodejs");
        assert_eq!(canonical_family("Node.js"), "nodejs");
        assert_eq!(canonical_family("golang"), "go");
        assert_eq!(canonical_family("rockylinux"), "rocky-linux");
        assert_eq!(canonical_family("python"), "python");
        // Unknown families pass through lowercased
        assert_eq!(canonical_family("Erlang"), "erlang");
    }

    #[test]
    fn test_display_names() {
        assert_eq!(family_display_name("nodejs"), "Node.js");
        assert_eq!(family_display_name("rocky-linux"), "Rocky Linux");
        assert_eq!(family_display_name("erlang"), "Erlang");
    }
}
