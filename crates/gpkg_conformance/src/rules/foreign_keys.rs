//! Requirement 7: `PRAGMA foreign_key_check` returns no rows.

use super::RuleId;
use crate::backend::{BackendError, DbRow, Store};
use crate::error::{CheckError, Result};
use crate::types::ForeignKeyViolation;
use crate::verdict::{Verdict, Violation};

pub(crate) const FOREIGN_KEY_CHECK_SQL: &str = "PRAGMA foreign_key_check";

const RULE: RuleId = RuleId::ForeignKeyCheck;

/// Run the whole-database foreign key consistency check.
pub fn foreign_key_check<S: Store>(store: &S) -> Result<Verdict> {
    let rows = store
        .query_all(FOREIGN_KEY_CHECK_SQL, &[])
        .map_err(CheckError::query(RULE))?;

    if rows.is_empty() {
        return Ok(Verdict::Pass);
    }

    let violations = rows
        .iter()
        .map(parse_row)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(CheckError::query(RULE))?;

    Ok(Verdict::fail(Violation::InvalidForeignKey { violations }))
}

// Columns: table, rowid, parent, fkid.
fn parse_row(row: &DbRow) -> std::result::Result<ForeignKeyViolation, BackendError> {
    Ok(ForeignKeyViolation {
        table: row.get(0)?,
        rowid: row.get(1)?,
        parent: row.get(2)?,
        fkid: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DbConnection;

    fn store_with_orphans(orphans: usize) -> DbConnection {
        let conn = DbConnection::open_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = OFF;
             CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER REFERENCES parent(id));
             INSERT INTO parent (id) VALUES (1);
             INSERT INTO child (id, parent_id) VALUES (1, 1);",
        )
        .unwrap();
        for i in 0..orphans {
            conn.execute(
                "INSERT INTO child (parent_id) VALUES (?)",
                &[crate::backend::DbValue::from(100 + i as i64)],
            )
            .unwrap();
        }
        conn
    }

    #[test]
    fn consistent_references_pass() {
        assert_eq!(foreign_key_check(&store_with_orphans(0)).unwrap(), Verdict::Pass);
    }

    #[test]
    fn dangling_reference_fails_with_detail() {
        let verdict = foreign_key_check(&store_with_orphans(1)).unwrap();

        match verdict.violations() {
            [Violation::InvalidForeignKey { violations }] => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].table, "child");
                assert_eq!(violations[0].parent, "parent");
                assert_eq!(violations[0].rowid, Some(2));
            }
            other => panic!("unexpected violations {:?}", other),
        }
    }

    #[test]
    fn every_dangling_row_is_reported() {
        let verdict = foreign_key_check(&store_with_orphans(3)).unwrap();

        assert!(verdict
            .diagnostic()
            .unwrap()
            .contains("3 invalid foreign key"));
    }
}
