//! Requirement 6: `PRAGMA integrity_check` returns "ok".

use super::RuleId;
use crate::backend::Store;
use crate::error::{CheckError, Result};
use crate::verdict::{Verdict, Violation};

pub(crate) const INTEGRITY_CHECK_SQL: &str = "PRAGMA integrity_check";

const RULE: RuleId = RuleId::IntegrityCheck;

/// Run SQLite's structural self-check.
///
/// Passes only on a single row reading "ok" (any case). Multiple rows are
/// diagnostics and fail, as does an empty result.
pub fn integrity_check<S: Store>(store: &S) -> Result<Verdict> {
    let rows = store
        .query_all(INTEGRITY_CHECK_SQL, &[])
        .map_err(CheckError::query(RULE))?;

    let results = rows
        .iter()
        .map(|row| row.get::<String>(0))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(CheckError::query(RULE))?;

    if let [only] = results.as_slice() {
        if only.eq_ignore_ascii_case("ok") {
            return Ok(Verdict::Pass);
        }
    }

    Ok(Verdict::fail(Violation::IntegrityCheckNotOk { results }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DbConnection, DbValue};
    use crate::testing::ScriptedStore;

    fn scripted(results: &[&str]) -> ScriptedStore {
        ScriptedStore::new().with_rows(
            INTEGRITY_CHECK_SQL,
            &["integrity_check"],
            results
                .iter()
                .map(|r| vec![DbValue::from(*r)])
                .collect(),
        )
    }

    #[test]
    fn healthy_database_passes() {
        let conn = DbConnection::open_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT); INSERT INTO t (v) VALUES ('x');")
            .unwrap();

        assert_eq!(integrity_check(&conn).unwrap(), Verdict::Pass);
    }

    #[test]
    fn ok_is_case_insensitive() {
        assert_eq!(integrity_check(&scripted(&["OK"])).unwrap(), Verdict::Pass);
    }

    #[test]
    fn error_text_is_reported() {
        let verdict = integrity_check(&scripted(&["error in table X"])).unwrap();

        assert!(!verdict.is_pass());
        assert!(verdict.diagnostic().unwrap().contains("error in table X"));
    }

    #[test]
    fn multiple_rows_fail_even_if_one_is_ok() {
        let verdict = integrity_check(&scripted(&["ok", "row 3 missing from index i1"])).unwrap();

        assert_eq!(
            verdict.violations(),
            [Violation::IntegrityCheckNotOk {
                results: vec!["ok".to_string(), "row 3 missing from index i1".to_string()],
            }]
        );
    }

    #[test]
    fn empty_result_fails() {
        let verdict = integrity_check(&scripted(&[])).unwrap();
        assert!(verdict.diagnostic().unwrap().contains("no result"));
    }

    #[test]
    fn query_failure_is_fatal() {
        let store = ScriptedStore::new().with_error(INTEGRITY_CHECK_SQL, "database disk image is malformed");

        let err = integrity_check(&store).unwrap_err();
        assert_eq!(err.rule(), RuleId::IntegrityCheck);
    }
}
