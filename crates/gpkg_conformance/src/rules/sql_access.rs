//! Requirement 8: GeoPackage contents are reachable through SQL.

use super::RuleId;
use crate::backend::Store;
use crate::error::Result;
use crate::verdict::{Verdict, Violation};
use tracing::debug;

pub(crate) const SQL_ACCESS_SQL: &str = "SELECT * FROM sqlite_master";

/// Confirm the store answers a master-catalog query.
///
/// A query error is the failure under test here, so it becomes a failing
/// verdict rather than a [`CheckError`](crate::CheckError).
pub fn sql_access<S: Store>(store: &S) -> Result<Verdict> {
    let outcome = store.query_all(SQL_ACCESS_SQL, &[]);

    Ok(match outcome {
        Ok(rows) => {
            debug!(rule = %RuleId::SqlAccess, entries = rows.len(), "sqlite_master readable");
            Verdict::Pass
        }
        Err(err) => Verdict::fail(Violation::NoSqlAccess {
            reason: err.to_string(),
        }),
    })
}
