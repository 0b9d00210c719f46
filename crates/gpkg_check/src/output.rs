//! Output formatting for reports and the rule catalogue.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use gpkg_conformance::{ConformanceReport, Outcome, RuleId, RuleReport};
use serde::Serialize;

/// Build the human-readable report table.
pub fn report_table(report: &ConformanceReport) -> Table {
    let mut table = new_table(&["Rule", "Requirement", "Status", "Details"]);

    for result in &report.results {
        let (status, color) = status_cell(&result.outcome);
        table.add_row(vec![
            Cell::new(result.rule.as_str()),
            Cell::new(&result.requirement),
            Cell::new(status).fg(color),
            Cell::new(details(result)),
        ]);
    }

    table
}

/// One-line summary printed under the table.
pub fn summary_line(report: &ConformanceReport) -> String {
    let verdict = if report.is_conformant() {
        "CONFORMANT"
    } else {
        "NOT CONFORMANT"
    };
    format!(
        "{}: {} passed, {} failed, {} errored",
        verdict,
        report.passed(),
        report.failed(),
        report.errored()
    )
}

pub fn print_report(report: &ConformanceReport) {
    println!("{}", report_table(report));
    println!("{}", summary_line(report));
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct RuleInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub requirement: String,
}

pub fn rule_catalogue() -> Vec<RuleInfo> {
    RuleId::ALL
        .iter()
        .map(|rule| RuleInfo {
            id: rule.as_str(),
            title: rule.title(),
            requirement: rule.requirement(),
        })
        .collect()
}

pub fn print_rules() {
    let mut table = new_table(&["Rule", "Requirement", "Title"]);
    for info in rule_catalogue() {
        table.add_row(vec![info.id.to_string(), info.requirement, info.title.to_string()]);
    }
    println!("{}", table);
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);
    table
}

fn status_cell(outcome: &Outcome) -> (&'static str, Color) {
    match outcome {
        Outcome::Pass => ("PASS", Color::Green),
        Outcome::Fail { .. } => ("FAIL", Color::Red),
        Outcome::Error { .. } => ("ERROR", Color::Yellow),
    }
}

fn details(result: &RuleReport) -> String {
    match &result.outcome {
        Outcome::Pass => String::new(),
        Outcome::Fail { violations } => violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        Outcome::Error { message } => message.clone(),
    }
}
