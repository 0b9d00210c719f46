//! Requirement 5: columns may only use GeoPackage data types.

use super::RuleId;
use crate::backend::{DbValue, Store};
use crate::data_types::is_allowed_type;
use crate::ddl::declared_columns;
use crate::error::{CheckError, Result};
use crate::types::{ColumnDescriptor, ContentsEntry, SchemaObject};
use crate::verdict::{Verdict, Violation};
use tracing::{debug, warn};

pub(crate) const CONTENTS_SQL: &str = "SELECT table_name FROM gpkg_contents";
pub(crate) const SCHEMA_OBJECT_SQL: &str = "SELECT type, sql FROM sqlite_master \
     WHERE type IN ('table', 'view') AND name = ? COLLATE NOCASE LIMIT 1";
pub(crate) const TABLE_INFO_SQL: &str = "SELECT name, type FROM pragma_table_info(?)";

const RULE: RuleId = RuleId::ColumnDataTypes;

/// Check the declared type of every column of every table named in
/// `gpkg_contents`.
///
/// Catalog entries naming a table or view absent from the schema are skipped.
/// All violations are collected; the verdict fails once with the full list.
pub fn column_data_types<S: Store>(store: &S) -> Result<Verdict> {
    let mut violations = Vec::new();

    for (row, entry) in contents_entries(store)?.into_iter().enumerate() {
        let Some(table_name) = entry.table_name else {
            warn!(row, "gpkg_contents row with NULL table_name skipped");
            continue;
        };

        let Some(object) = schema_object(store, &table_name)? else {
            warn!(row, table = %table_name, "gpkg_contents references missing table or view; skipped");
            continue;
        };

        let columns = table_columns(store, &table_name, &object)?;
        debug!(table = %table_name, columns = columns.len(), "Checking column data types");

        for column in columns {
            if !is_allowed_type(&column.declared_type) {
                violations.push(Violation::InvalidDataType {
                    table_name: table_name.clone(),
                    column_name: column.name,
                    data_type: column.declared_type,
                });
            }
        }
    }

    Ok(Verdict::from_violations(violations))
}

fn contents_entries<S: Store>(store: &S) -> Result<Vec<ContentsEntry>> {
    let rows = store
        .query_all(CONTENTS_SQL, &[])
        .map_err(CheckError::query(RULE))?;

    rows.iter()
        .map(|row| {
            Ok::<_, CheckError>(ContentsEntry {
                table_name: row.get(0).map_err(CheckError::query(RULE))?,
            })
        })
        .collect()
}

fn schema_object<S: Store>(store: &S, table_name: &str) -> Result<Option<SchemaObject>> {
    let Some(row) = store
        .query_optional(SCHEMA_OBJECT_SQL, &[DbValue::from(table_name)])
        .map_err(CheckError::query(RULE))?
    else {
        return Ok(None);
    };

    Ok(Some(SchemaObject {
        kind: row.get(0).map_err(CheckError::query(RULE))?,
        sql: row.get(1).map_err(CheckError::query(RULE))?,
    }))
}

/// Columns from `pragma_table_info`, with the declared type taken from the
/// stored `CREATE TABLE` text where it can be read. View columns keep the
/// engine's reported type.
fn table_columns<S: Store>(
    store: &S,
    table_name: &str,
    object: &SchemaObject,
) -> Result<Vec<ColumnDescriptor>> {
    let declared = match (object.kind.as_str(), object.sql.as_deref()) {
        ("table", Some(sql)) => declared_columns(sql).unwrap_or_default(),
        _ => Vec::new(),
    };

    let rows = store
        .query_all(TABLE_INFO_SQL, &[DbValue::from(table_name)])
        .map_err(CheckError::query(RULE))?;

    rows.iter()
        .map(|row| {
            let name: String = row.get(0).map_err(CheckError::query(RULE))?;
            let reported: Option<String> = row.get(1).map_err(CheckError::query(RULE))?;
            let declared_type = declared
                .iter()
                .find(|(column, _)| column.eq_ignore_ascii_case(&name))
                .map(|(_, declared_type)| declared_type.clone())
                .unwrap_or_else(|| reported.unwrap_or_default());
            Ok::<_, CheckError>(ColumnDescriptor {
                name,
                declared_type,
            })
        })
        .collect()
}
