//! eolscan: end-of-life / end-of-support exposure scanner.
//!
//! Scans project directories or GitHub repositories for runtimes, base
//! images, and packages, and reports their lifecycle status and risk.

#[cfg(feature = "fetch")]
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eolscan::config::ScanConfig;
use eolscan::discovery::{parse_sbom_document, scan_project_files};
#[cfg(feature = "fetch")]
use eolscan::model::TechnologyKind;
use eolscan::model::{EvidenceSource, Finding};
#[cfg(feature = "fetch")]
use eolscan::pipeline::package_key;
use eolscan::pipeline::{run, ScanInput};
use eolscan::reports::{render_json, render_table, summarize};

#[derive(Parser)]
#[command(name = "eolscan")]
#[command(version)]
#[command(about = "End-of-life and end-of-support exposure scanner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one or more local project directories
    Path(PathArgs),
    /// Scan a GitHub repository via its dependency-graph SBOM
    Repo(RepoArgs),
}

#[derive(Args)]
struct PathArgs {
    /// Project directory to scan (repeatable for batch mode)
    #[arg(long = "dir", required = true)]
    dirs: Vec<PathBuf>,

    /// SBOM file (SPDX or CycloneDX JSON) to use as additional evidence
    #[arg(long)]
    sbom: Option<PathBuf>,

    #[command(flatten)]
    scan: ScanFlags,
}

#[derive(Args)]
struct RepoArgs {
    /// Repository in owner/name form
    #[arg(long)]
    repo: String,

    /// GitHub token for private repositories and higher rate limits
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(flatten)]
    scan: ScanFlags,
}

#[derive(Args)]
struct ScanFlags {
    /// Months of remaining support that count as "Near EOL"
    #[arg(long, default_value_t = eolscan::config::DEFAULT_NEAR_MONTHS)]
    near_months: u32,

    /// Months without a release that count as "Potentially unmaintained"
    #[arg(long, default_value_t = eolscan::config::DEFAULT_STALE_MONTHS)]
    stale_months: u32,

    /// Skip risk scoring
    #[arg(long)]
    no_risk: bool,

    /// Write the JSON report to a file as well
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

impl ScanFlags {
    fn to_config(&self) -> ScanConfig {
        ScanConfig {
            near_months: self.near_months,
            stale_months: self.stale_months,
            score_risk: !self.no_risk,
            ..ScanConfig::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Path(args) => scan_paths(&args),
        Commands::Repo(args) => scan_repo(&args),
    }
}

fn scan_paths(args: &PathArgs) -> Result<()> {
    let config = args.scan.to_config();
    let batch = args.dirs.len() > 1;

    for dir in &args.dirs {
        let mut evidence = Vec::new();
        if let Some(sbom_path) = &args.sbom {
            let content = fs::read_to_string(sbom_path)
                .with_context(|| format!("reading SBOM file {}", sbom_path.display()))?;
            evidence.extend(parse_sbom_document(&content, EvidenceSource::LocalSbomFile)?);
        }
        evidence.extend(scan_project_files(dir));

        if batch {
            println!("== {} ==", dir.display());
        }
        let input = enrich_input(ScanInput {
            evidence,
            ..ScanInput::default()
        });
        let findings = run(&input, &config)?;
        emit(&findings, &args.scan)?;
    }
    Ok(())
}

fn scan_repo(args: &RepoArgs) -> Result<()> {
    let config = args.scan.to_config();
    let evidence = fetch_repo_evidence(&args.repo, args.token.clone())?;
    let input = enrich_input(ScanInput {
        evidence,
        ..ScanInput::default()
    });
    let findings = run(&input, &config)?;
    emit(&findings, &args.scan)
}

#[cfg(feature = "fetch")]
fn fetch_repo_evidence(
    repo: &str,
    token: Option<String>,
) -> Result<Vec<eolscan::model::TechnologyUsage>> {
    let client = eolscan::fetch::GithubClient::new(token)?;
    let document = client
        .fetch_dependency_sbom(repo)
        .with_context(|| format!("fetching dependency-graph SBOM for {repo}"))?;
    Ok(parse_sbom_document(&document, EvidenceSource::RemoteSbom)?)
}

#[cfg(not(feature = "fetch"))]
fn fetch_repo_evidence(
    _repo: &str,
    _token: Option<String>,
) -> Result<Vec<eolscan::model::TechnologyUsage>> {
    anyhow::bail!("repo scanning requires the 'fetch' feature")
}

/// Attach the lifecycle dataset and registry metadata the evidence needs.
#[cfg(feature = "fetch")]
fn enrich_input(mut input: ScanInput) -> ScanInput {
    let families: HashSet<&str> = input
        .evidence
        .iter()
        .filter(|u| u.kind != TechnologyKind::Package)
        .map(|u| u.family.as_str())
        .collect();
    if !families.is_empty() {
        match eolscan::fetch::EolApiClient::new() {
            Ok(client) => {
                let slugs: Vec<&str> = families.into_iter().collect();
                input.dataset = client.load_dataset(&slugs);
            }
            Err(err) => warn!(%err, "lifecycle dataset unavailable"),
        }
    }

    let packages: Vec<(String, String)> = input
        .evidence
        .iter()
        .filter(|u| u.kind == TechnologyKind::Package)
        .filter_map(|u| u.ecosystem.as_ref().map(|e| (e.clone(), u.name.clone())))
        .collect();
    if !packages.is_empty() {
        match eolscan::fetch::RegistryClient::new() {
            Ok(client) => {
                for (ecosystem, name) in packages {
                    if let Some(release) = client.release_info(&ecosystem, &name) {
                        input
                            .releases
                            .insert(package_key(&ecosystem, &name), release);
                    }
                }
            }
            Err(err) => warn!(%err, "registry metadata unavailable"),
        }
    }
    input
}

#[cfg(not(feature = "fetch"))]
fn enrich_input(input: ScanInput) -> ScanInput {
    warn!("built without the 'fetch' feature: dataset and registry lookups skipped");
    input
}

fn emit(findings: &[Finding], flags: &ScanFlags) -> Result<()> {
    match flags.output {
        OutputFormat::Table => {
            print!("{}", render_table(findings));
            let summary = summarize(findings);
            println!(
                "\n{} items: {} EOL, {} near EOL, {} supported, {} unknown ({} critical, {} high risk)",
                summary.total_items,
                summary.eol_count,
                summary.near_eol_count,
                summary.supported_count,
                summary.unknown_count,
                summary.critical_risks,
                summary.high_risks,
            );
        }
        OutputFormat::Json => println!("{}", render_json(findings)?),
    }

    if let Some(out) = &flags.out {
        fs::write(out, render_json(findings)?)
            .with_context(|| format!("writing report to {}", out.display()))?;
        info!(path = %out.display(), "report written");
    }
    Ok(())
}
