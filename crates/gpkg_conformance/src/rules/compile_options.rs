//! Requirement 9: the SQLite library keeps its default feature set.

use super::RuleId;
use crate::backend::Store;
use crate::error::{CheckError, Result};
use crate::verdict::{Verdict, Violation};

/// `sqlite_compileoption_used()` matches names exactly, so the wildcard is
/// applied over the full option list instead.
pub(crate) const OMIT_OPTIONS_SQL: &str = "SELECT compile_options FROM pragma_compile_options \
     WHERE compile_options LIKE 'OMIT\\_%' ESCAPE '\\'";

const RULE: RuleId = RuleId::SqliteOptions;

/// Fail if any `SQLITE_OMIT_*` option was used to build the store's library.
pub fn sqlite_options<S: Store>(store: &S) -> Result<Verdict> {
    let rows = store
        .query_all(OMIT_OPTIONS_SQL, &[])
        .map_err(CheckError::query(RULE))?;

    let options = rows
        .iter()
        .map(|row| row.get::<String>(0))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(CheckError::query(RULE))?;

    if options.is_empty() {
        return Ok(Verdict::Pass);
    }

    Ok(Verdict::fail(Violation::SqliteOmitOptions {
        count: options.len(),
        options,
    }))
}
