//! Declared column types permitted in a GeoPackage.
//!
//! The table is fixed by the encoding standard (OGC 12-128r12, "GeoPackage
//! Data Types"). Matching is case-sensitive on the type string exactly as
//! SQLite recorded it at table-creation time.

use regex::Regex;
use std::sync::LazyLock;

/// Exact-match type names.
pub const ALLOWED_SQL_TYPES: &[&str] = &[
    "BOOLEAN",
    "TINYINT",
    "SMALLINT",
    "MEDIUMINT",
    "INT",
    "INTEGER",
    "FLOAT",
    "DOUBLE",
    "REAL",
    "TEXT",
    "BLOB",
    "DATE",
    "DATETIME",
    "GEOMETRY",
    "POINT",
    "LINESTRING",
    "POLYGON",
    "MULTIPOINT",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "GEOMETRYCOLLECTION",
];

// Size qualifiers must be positive; leading zeros are tolerated.
static TEXT_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TEXT\(0*[1-9][0-9]*\)$").unwrap());
static BLOB_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^BLOB\(0*[1-9][0-9]*\)$").unwrap());

/// Returns true if `declared_type` is a GeoPackage data type.
///
/// ```
/// use gpkg_conformance::is_allowed_type;
///
/// assert!(is_allowed_type("MULTIPOLYGON"));
/// assert!(is_allowed_type("TEXT(255)"));
/// assert!(!is_allowed_type("VARCHAR"));
/// ```
pub fn is_allowed_type(declared_type: &str) -> bool {
    ALLOWED_SQL_TYPES.contains(&declared_type)
        || TEXT_TYPE.is_match(declared_type)
        || BLOB_TYPE.is_match(declared_type)
}
