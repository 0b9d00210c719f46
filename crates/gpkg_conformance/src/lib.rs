//! GeoPackage conformance rules.
//!
//! Checks an existing SQLite file against the file-level requirements of the
//! GeoPackage encoding standard (OGC 12-128r12, Requirements 5-9). Nothing is
//! ever written to the file under test.
//!
//! # Usage
//!
//! ```rust,no_run
//! use gpkg_conformance::{run_all, DbConnection};
//!
//! let conn = DbConnection::open_readonly("roads.gpkg")?;
//! let report = run_all(&conn);
//! for result in &report.results {
//!     println!("{}: {:?}", result.rule, result.outcome);
//! }
//! # Ok::<(), gpkg_conformance::BackendError>(())
//! ```

mod backend;
mod data_types;
mod ddl;
mod error;
mod report;
mod types;
mod verdict;

pub mod rules;

#[cfg(test)]
mod testing;

pub use backend::{BackendError, DbConnection, DbRow, DbValue, FromDbValue, Store};
pub use data_types::{is_allowed_type, ALLOWED_SQL_TYPES};
pub use error::{CheckError, Result};
pub use report::{run_all, run_rules, ConformanceReport, Outcome, RuleReport};
pub use rules::RuleId;
pub use types::{ColumnDescriptor, ContentsEntry, ForeignKeyViolation};
pub use verdict::{Verdict, Violation};
