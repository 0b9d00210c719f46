//! Rule verdicts and the violations that back a failure.

use crate::types::ForeignKeyViolation;
use serde::Serialize;
use std::fmt;

/// A single non-conforming element, with enough context to locate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    InvalidDataType {
        table_name: String,
        column_name: String,
        data_type: String,
    },
    IntegrityCheckNotOk {
        results: Vec<String>,
    },
    InvalidForeignKey {
        violations: Vec<ForeignKeyViolation>,
    },
    NoSqlAccess {
        reason: String,
    },
    SqliteOmitOptions {
        count: usize,
        options: Vec<String>,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::InvalidDataType {
                table_name,
                column_name,
                data_type,
            } => write!(
                f,
                "Invalid data type '{}' for column '{}' in table '{}'",
                data_type, column_name, table_name
            ),
            Violation::IntegrityCheckNotOk { results } if results.is_empty() => {
                write!(f, "PRAGMA integrity_check returned no result")
            }
            Violation::IntegrityCheckNotOk { results } => write!(
                f,
                "PRAGMA integrity_check did not return 'ok': {}",
                results.join("; ")
            ),
            Violation::InvalidForeignKey { violations } => {
                write!(
                    f,
                    "PRAGMA foreign_key_check reported {} invalid foreign key value(s)",
                    violations.len()
                )?;
                for (i, violation) in violations.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { "; " };
                    write!(f, "{}{}", sep, violation)?;
                }
                Ok(())
            }
            Violation::NoSqlAccess { reason } => {
                write!(f, "No SQL access to GeoPackage contents: {}", reason)
            }
            Violation::SqliteOmitOptions { count, options } => write!(
                f,
                "SQLite library was built with {} SQLITE_OMIT_* option(s): {}",
                count,
                options.join(", ")
            ),
        }
    }
}

/// Outcome of one conformance rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    /// Never constructed with an empty list.
    Fail { violations: Vec<Violation> },
}

impl Verdict {
    pub fn fail(violation: Violation) -> Self {
        Verdict::Fail {
            violations: vec![violation],
        }
    }

    /// `Pass` when `violations` is empty, otherwise `Fail`.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail { violations }
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Verdict::Pass => &[],
            Verdict::Fail { violations } => violations,
        }
    }

    /// Human-readable diagnostic for a failing verdict.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail { violations } => Some(
                violations
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }
    }
}
