//! GeoPackage conformance checker
//!
//! Opens an existing GeoPackage read-only, runs the file-level conformance
//! rules, and reports a verdict per rule.
//!
//! Exit codes: 0 conformant, 1 not conformant, 2 a rule (or the file) could
//! not be checked.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gpkg_conformance::{run_rules, ConformanceReport, DbConnection, RuleId};
use gpkg_logging::LogConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

mod error;
mod output;

use error::HelpfulError;

#[derive(Parser, Debug)]
#[command(name = "gpkg_check", version, about = "Check GeoPackage files for conformance")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Directory for log files (default: ~/.gpkg_check/logs)
    #[arg(long, global = true, env = "GPKG_CHECK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run conformance rules against a GeoPackage file
    Check {
        /// GeoPackage file to check
        path: PathBuf,

        /// Run only this rule (id or requirement number); repeatable
        #[arg(short = 'r', long = "rule", value_name = "ID")]
        rules: Vec<RuleId>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the available rules
    Rules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Overall result of a command, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckStatus {
    Conformant,
    NotConformant,
    Incomplete,
}

impl CheckStatus {
    fn from_report(report: &ConformanceReport) -> Self {
        if report.errored() > 0 {
            CheckStatus::Incomplete
        } else if report.is_conformant() {
            CheckStatus::Conformant
        } else {
            CheckStatus::NotConformant
        }
    }

    fn exit_code(self) -> ExitCode {
        match self {
            CheckStatus::Conformant => ExitCode::SUCCESS,
            CheckStatus::NotConformant => ExitCode::from(1),
            CheckStatus::Incomplete => ExitCode::from(2),
        }
    }
}

fn run_command(cli: Cli) -> Result<CheckStatus> {
    match cli.command {
        Commands::Check { path, rules, json } => run_check(&path, &selected_rules(&rules), json),
        Commands::Rules { json } => {
            if json {
                output::print_json(&output::rule_catalogue())
                    .context("Failed to write rule catalogue")?;
            } else {
                output::print_rules();
            }
            Ok(CheckStatus::Conformant)
        }
    }
}

fn run_check(path: &Path, rules: &[RuleId], json: bool) -> Result<CheckStatus> {
    let conn = open_geopackage(path)
        .with_context(|| format!("Failed to open {} for checking", path.display()))?;
    info!(path = %path.display(), rules = rules.len(), "Checking GeoPackage");

    let report = run_rules(&conn, rules);

    if json {
        output::print_json(&report).context("Failed to write JSON report")?;
    } else {
        output::print_report(&report);
    }

    let status = CheckStatus::from_report(&report);
    if status != CheckStatus::Conformant {
        if let Some(err) = unreadable_file_error(&conn, path) {
            eprintln!("\n{}", err);
        }
    }
    Ok(status)
}

/// A helpful error when the rules failed because the file is not a database.
fn unreadable_file_error(conn: &DbConnection, path: &Path) -> Option<HelpfulError> {
    match conn.check_readable() {
        Err(err) if err.is_not_a_database() => {
            Some(HelpfulError::not_a_database(path, &err.to_string()))
        }
        _ => None,
    }
}

fn open_geopackage(path: &Path) -> Result<DbConnection, HelpfulError> {
    if !path.exists() {
        return Err(HelpfulError::file_not_found(path));
    }
    if !path.is_file() {
        return Err(HelpfulError::not_a_file(path));
    }
    DbConnection::open_readonly(path)
        .map_err(|err| HelpfulError::cannot_open(path, &err.to_string()))
}

/// All rules when none were requested; otherwise the request, deduplicated in
/// the order given.
fn selected_rules(requested: &[RuleId]) -> Vec<RuleId> {
    if requested.is_empty() {
        return RuleId::ALL.to_vec();
    }
    let mut rules = Vec::with_capacity(requested.len());
    for rule in requested {
        if !rules.contains(rule) {
            rules.push(*rule);
        }
    }
    rules
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = gpkg_logging::init_logging(LogConfig {
        app_name: "gpkg_check",
        verbose: cli.verbose,
        log_dir: cli.log_dir.clone(),
    });

    match run_command(cli) {
        Ok(status) => status.exit_code(),
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::from(2)
        }
    }
}
