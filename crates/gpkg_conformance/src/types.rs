//! Records read from the store during a check.
//!
//! Nothing here is written back; every value is rebuilt from introspection
//! queries on each run.

use serde::Serialize;

/// One `gpkg_contents` row. `None` when the stored `table_name` is NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentsEntry {
    pub table_name: Option<String>,
}

/// A `sqlite_master` row for a table or view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SchemaObject {
    /// `table` or `view`.
    pub kind: String,
    /// Stored `CREATE` text. NULL for some internal objects.
    pub sql: Option<String>,
}

/// A column name from `pragma_table_info` and its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared type, case as stored. Empty for untyped columns.
    pub declared_type: String,
}

/// One row of `PRAGMA foreign_key_check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyViolation {
    pub table: String,
    /// NULL for WITHOUT ROWID tables.
    pub rowid: Option<i64>,
    pub parent: String,
    pub fkid: i64,
}

impl std::fmt::Display for ForeignKeyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.rowid {
            Some(rowid) => write!(
                f,
                "'{}' rowid {} references missing row in '{}' (constraint {})",
                self.table, rowid, self.parent, self.fkid
            ),
            None => write!(
                f,
                "'{}' references missing row in '{}' (constraint {})",
                self.table, self.parent, self.fkid
            ),
        }
    }
}
