//! Report rendering: JSON output, an aligned text table, and summary
//! statistics over a finding list.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Finding, RiskLevel};

/// Aggregate statistics over one scan's findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_items: usize,
    pub eol_count: usize,
    pub near_eol_count: usize,
    pub supported_count: usize,
    pub unknown_count: usize,
    /// Risk-level distribution; unscored findings count under "UNKNOWN"
    pub risk_levels: IndexMap<String, usize>,
    pub critical_risks: usize,
    pub high_risks: usize,
}

/// Compute summary statistics for a finding list.
#[must_use]
pub fn summarize(findings: &[Finding]) -> ScanSummary {
    let count_status =
        |label: &str| findings.iter().filter(|f| f.status.label() == label).count();

    let mut risk_levels: IndexMap<String, usize> = IndexMap::new();
    for finding in findings {
        let label = finding
            .risk_level
            .map_or("UNKNOWN", RiskLevel::label)
            .to_string();
        *risk_levels.entry(label).or_insert(0) += 1;
    }

    ScanSummary {
        total_items: findings.len(),
        eol_count: count_status("EOL"),
        near_eol_count: count_status("Near EOL"),
        supported_count: count_status("Supported"),
        unknown_count: count_status("Unknown"),
        critical_risks: risk_levels.get("CRITICAL").copied().unwrap_or(0),
        high_risks: risk_levels.get("HIGH").copied().unwrap_or(0),
        risk_levels,
    }
}

/// Render findings as pretty-printed JSON.
pub fn render_json(findings: &[Finding]) -> Result<String> {
    Ok(serde_json::to_string_pretty(findings)?)
}

const TABLE_HEADERS: [&str; 8] = [
    "type", "name", "version", "status", "eol_date", "days", "latest", "risk",
];

/// Render findings as an aligned text table with a header separator row.
#[must_use]
pub fn render_table(findings: &[Finding]) -> String {
    let rows: Vec<[String; 8]> = findings.iter().map(table_row).collect();

    let mut widths: [usize; 8] = TABLE_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let render_row = |cells: &[String; 8]| -> String {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<w$}", w = *width))
            .collect::<Vec<_>>()
            .join("  ");
        line.trim_end().to_string()
    };

    out.push_str(&render_row(&TABLE_HEADERS.map(str::to_string)));
    out.push('\n');
    out.push_str(&render_row(&widths.map(|w| "-".repeat(w))));
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out
}

fn table_row(finding: &Finding) -> [String; 8] {
    let opt = |value: Option<String>| value.unwrap_or_default();
    [
        finding.kind.wire_name().to_string(),
        finding.name.clone(),
        opt(finding.version.clone()),
        finding.status.label().to_string(),
        opt(finding.eol_date.map(|d| d.to_string())),
        opt(finding
            .days_to_eol
            .or(finding.days_since_release)
            .map(|d| d.to_string())),
        opt(finding.latest_version.clone()),
        opt(finding.risk_level.map(|l| l.label().to_string())),
    ]
}
