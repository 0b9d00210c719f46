//! The conformance rules.
//!
//! Each rule is independent and stateless: it issues its queries once,
//! releases every statement before returning, and never writes to the store.

mod column_types;
mod compile_options;
mod foreign_keys;
mod integrity;
mod sql_access;

pub use column_types::column_data_types;
pub use compile_options::sqlite_options;
pub use foreign_keys::foreign_key_check;
pub use integrity::integrity_check;
pub use sql_access::sql_access;

use crate::backend::Store;
use crate::error::Result;
use crate::verdict::Verdict;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Identifies one conformance rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    ColumnDataTypes,
    IntegrityCheck,
    ForeignKeyCheck,
    SqlAccess,
    SqliteOptions,
}

impl RuleId {
    /// Every rule, in requirement order.
    pub const ALL: [RuleId; 5] = [
        RuleId::ColumnDataTypes,
        RuleId::IntegrityCheck,
        RuleId::ForeignKeyCheck,
        RuleId::SqlAccess,
        RuleId::SqliteOptions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::ColumnDataTypes => "column_data_types",
            RuleId::IntegrityCheck => "integrity_check",
            RuleId::ForeignKeyCheck => "foreign_key_check",
            RuleId::SqlAccess => "sql_access",
            RuleId::SqliteOptions => "sqlite_options",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RuleId::ColumnDataTypes => "Column data types",
            RuleId::IntegrityCheck => "File integrity (PRAGMA integrity_check)",
            RuleId::ForeignKeyCheck => "File integrity (PRAGMA foreign_key_check)",
            RuleId::SqlAccess => "Structured Query Language access",
            RuleId::SqliteOptions => "Every GeoPackage SQLite configuration",
        }
    }

    /// Requirement number in OGC 12-128r12.
    pub fn requirement_number(&self) -> u8 {
        match self {
            RuleId::ColumnDataTypes => 5,
            RuleId::IntegrityCheck => 6,
            RuleId::ForeignKeyCheck => 7,
            RuleId::SqlAccess => 8,
            RuleId::SqliteOptions => 9,
        }
    }

    pub fn requirement(&self) -> String {
        format!("OGC 12-128r12: Requirement {}", self.requirement_number())
    }

    /// Evaluate this rule against `store`.
    pub fn check<S: Store>(&self, store: &S) -> Result<Verdict> {
        match self {
            RuleId::ColumnDataTypes => column_data_types(store),
            RuleId::IntegrityCheck => integrity_check(store),
            RuleId::ForeignKeyCheck => foreign_key_check(store),
            RuleId::SqlAccess => sql_access(store),
            RuleId::SqliteOptions => sqlite_options(store),
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a rule id (`integrity_check`, `integrity-check`) or its
/// requirement number (`6`).
impl FromStr for RuleId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        RuleId::ALL
            .into_iter()
            .find(|rule| {
                rule.as_str() == normalized || rule.requirement_number().to_string() == normalized
            })
            .ok_or_else(|| {
                let known: Vec<&str> = RuleId::ALL.iter().map(|r| r.as_str()).collect();
                format!("Unknown rule '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_str() {
        for rule in RuleId::ALL {
            assert_eq!(rule.as_str().parse::<RuleId>().unwrap(), rule);
        }
    }

    #[test]
    fn parses_requirement_numbers_and_dashes() {
        assert_eq!("6".parse::<RuleId>().unwrap(), RuleId::IntegrityCheck);
        assert_eq!(
            "Foreign-Key-Check".parse::<RuleId>().unwrap(),
            RuleId::ForeignKeyCheck
        );
    }

    #[test]
    fn unknown_rule_lists_known_ids() {
        let err = "requirement_10".parse::<RuleId>().unwrap_err();
        assert!(err.contains("sql_access"));
    }

    #[test]
    fn requirements_are_five_through_nine() {
        let numbers: Vec<u8> = RuleId::ALL.iter().map(|r| r.requirement_number()).collect();
        assert_eq!(numbers, vec![5, 6, 7, 8, 9]);
        assert_eq!(
            RuleId::SqlAccess.requirement(),
            "OGC 12-128r12: Requirement 8"
        );
    }
}
