//! Column declarations read back from stored `CREATE TABLE` text.
//!
//! `pragma_table_info` reports the standard type names (`int`, `text`, ...)
//! upper-cased, so the declared type as written is taken from
//! `sqlite_master.sql` instead.

/// Column names and declared types, in declaration order.
///
/// Returns `None` for anything that is not a plain `CREATE [TEMP] TABLE`
/// statement with a column list (virtual tables, views, unparseable text).
/// A column without a type has an empty declared type.
pub(crate) fn declared_columns(create_sql: &str) -> Option<Vec<(String, String)>> {
    let tokens = tokenize(create_sql);
    let mut iter = tokens.iter().enumerate();

    let (_, first) = iter.next()?;
    if !first.is_keyword(create_sql, "CREATE") {
        return None;
    }
    let (_, mut next) = iter.next()?;
    if next.is_keyword(create_sql, "TEMP") || next.is_keyword(create_sql, "TEMPORARY") {
        next = iter.next()?.1;
    }
    if !next.is_keyword(create_sql, "TABLE") {
        return None;
    }

    let open = iter.find(|(_, t)| t.kind == TokenKind::Open)?.0;
    let body = &tokens[open + 1..];

    let mut definitions: Vec<&[Token]> = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut closed = false;
    for (i, token) in body.iter().enumerate() {
        match token.kind {
            TokenKind::Open => depth += 1,
            TokenKind::Close if depth == 0 => {
                definitions.push(&body[start..i]);
                closed = true;
                break;
            }
            TokenKind::Close => depth -= 1,
            TokenKind::Comma if depth == 0 => {
                definitions.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if !closed {
        return None;
    }

    let mut columns = Vec::new();
    for definition in definitions {
        let name = definition.first()?;
        if TABLE_CONSTRAINTS
            .iter()
            .any(|kw| name.is_keyword(create_sql, kw))
        {
            continue;
        }
        columns.push((name.identifier(create_sql), declared_type(create_sql, &definition[1..])));
    }
    Some(columns)
}

const TABLE_CONSTRAINTS: &[&str] = &["CONSTRAINT", "PRIMARY", "UNIQUE", "CHECK", "FOREIGN"];

const COLUMN_CONSTRAINTS: &[&str] = &[
    "CONSTRAINT",
    "PRIMARY",
    "NOT",
    "NULL",
    "UNIQUE",
    "CHECK",
    "DEFAULT",
    "COLLATE",
    "REFERENCES",
    "GENERATED",
    "AS",
];

/// The source span of the type name: words up to the first column
/// constraint, plus an optional parenthesised size.
fn declared_type(sql: &str, tokens: &[Token]) -> String {
    let mut end = None;
    let mut i = 0;
    while let Some(token) = tokens.get(i) {
        match token.kind {
            TokenKind::Word | TokenKind::Quoted
                if !COLUMN_CONSTRAINTS.iter().any(|kw| token.is_keyword(sql, kw)) =>
            {
                end = Some(i);
                i += 1;
            }
            TokenKind::Open if end.is_some() => {
                let mut depth = 0usize;
                for (j, inner) in tokens.iter().enumerate().skip(i) {
                    match inner.kind {
                        TokenKind::Open => depth += 1,
                        TokenKind::Close => {
                            depth -= 1;
                            if depth == 0 {
                                end = Some(j);
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                break;
            }
            _ => break,
        }
    }

    match (tokens.first(), end) {
        (Some(first), Some(last)) => sql[first.start..tokens[last].end].to_string(),
        _ => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Quoted,
    Open,
    Close,
    Comma,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

impl Token {
    fn is_keyword(&self, sql: &str, keyword: &str) -> bool {
        self.kind == TokenKind::Word && sql[self.start..self.end].eq_ignore_ascii_case(keyword)
    }

    /// Identifier text with any quoting removed.
    fn identifier(&self, sql: &str) -> String {
        let text = &sql[self.start..self.end];
        if self.kind != TokenKind::Quoted || text.len() < 2 {
            return text.to_string();
        }
        let inner = &text[1..text.len() - 1];
        match text.as_bytes()[0] {
            b'"' => inner.replace("\"\"", "\""),
            b'`' => inner.replace("``", "`"),
            b'\'' => inner.replace("''", "'"),
            _ => inner.to_string(),
        }
    }
}

fn tokenize(sql: &str) -> Vec<Token> {
    let bytes = sql.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let byte = bytes[pos];
        let kind = match byte {
            b if b.is_ascii_whitespace() => {
                pos += 1;
                continue;
            }
            b'-' if bytes.get(pos + 1) == Some(&b'-') => {
                pos = sql[pos..].find('\n').map_or(bytes.len(), |n| pos + n + 1);
                continue;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos = sql[pos + 2..].find("*/").map_or(bytes.len(), |n| pos + 2 + n + 2);
                continue;
            }
            b'"' | b'`' | b'\'' | b'[' => {
                let close = if byte == b'[' { b']' } else { byte };
                pos += 1;
                loop {
                    match bytes.get(pos) {
                        None => break,
                        Some(&b) if b == close => {
                            pos += 1;
                            // A doubled quote is an escaped quote, except for brackets.
                            if close != b']' && bytes.get(pos) == Some(&close) {
                                pos += 1;
                            } else {
                                break;
                            }
                        }
                        Some(_) => pos += 1,
                    }
                }
                TokenKind::Quoted
            }
            b'(' => {
                pos += 1;
                TokenKind::Open
            }
            b')' => {
                pos += 1;
                TokenKind::Close
            }
            b',' => {
                pos += 1;
                TokenKind::Comma
            }
            b if is_word_byte(b) => {
                while bytes.get(pos).is_some_and(|&b| is_word_byte(b)) {
                    pos += 1;
                }
                TokenKind::Word
            }
            _ => {
                pos += sql[pos..].chars().next().map_or(1, char::len_utf8);
                TokenKind::Other
            }
        };
        tokens.push(Token {
            kind,
            start,
            end: pos,
        });
    }

    tokens
}

/// Identifier and number characters. Non-ASCII bytes count as identifier
/// characters, so multi-byte names stay whole.
fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$' || byte >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(sql: &str) -> Vec<(String, String)> {
        declared_columns(sql).unwrap()
    }

    fn pair(name: &str, declared: &str) -> (String, String) {
        (name.to_string(), declared.to_string())
    }

    #[test]
    fn keeps_declared_case() {
        assert_eq!(
            columns("CREATE TABLE t (a text, b integer, c int, d real, e blob)"),
            vec![
                pair("a", "text"),
                pair("b", "integer"),
                pair("c", "int"),
                pair("d", "real"),
                pair("e", "blob"),
            ]
        );
    }

    #[test]
    fn stops_type_at_column_constraints() {
        assert_eq!(
            columns(
                "CREATE TABLE roads (fid INTEGER PRIMARY KEY AUTOINCREMENT, \
                 name TEXT(128) NOT NULL DEFAULT 'x, y', code TEXT COLLATE NOCASE, \
                 srs INTEGER REFERENCES srs(id), loose)"
            ),
            vec![
                pair("fid", "INTEGER"),
                pair("name", "TEXT(128)"),
                pair("code", "TEXT"),
                pair("srs", "INTEGER"),
                pair("loose", ""),
            ]
        );
    }

    #[test]
    fn keeps_multi_word_types_and_sizes() {
        assert_eq!(
            columns("CREATE TABLE t (a DOUBLE PRECISION, b DECIMAL(10, 2), c VARCHAR (20))"),
            vec![
                pair("a", "DOUBLE PRECISION"),
                pair("b", "DECIMAL(10, 2)"),
                pair("c", "VARCHAR (20)"),
            ]
        );
    }

    #[test]
    fn skips_table_constraints() {
        assert_eq!(
            columns(
                "CREATE TABLE g (table_name TEXT NOT NULL, srs_id INTEGER, \
                 CONSTRAINT pk PRIMARY KEY (table_name), \
                 FOREIGN KEY (srs_id) REFERENCES s(srs_id), UNIQUE (srs_id), CHECK (srs_id > 0))"
            ),
            vec![pair("table_name", "TEXT"), pair("srs_id", "INTEGER")]
        );
    }

    #[test]
    fn unquotes_identifiers() {
        assert_eq!(
            columns(
                "CREATE TABLE \"it's\" (\"my \"\"col\"\"\" text, [b c] BLOB, `d` MEDIUMINT) -- done"
            ),
            vec![
                pair("my \"col\"", "text"),
                pair("b c", "BLOB"),
                pair("d", "MEDIUMINT"),
            ]
        );
    }

    #[test]
    fn ignores_comments() {
        assert_eq!(
            columns("CREATE TEMP TABLE t ( -- ids\n id integer /* pk, really */ , v REAL)"),
            vec![pair("id", "integer"), pair("v", "REAL")]
        );
    }

    #[test]
    fn rejects_other_statements() {
        assert_eq!(
            declared_columns("CREATE VIRTUAL TABLE r USING rtree(id, minx, maxx)"),
            None
        );
        assert_eq!(declared_columns("CREATE VIEW v AS SELECT 1"), None);
        assert_eq!(declared_columns("CREATE TABLE t (a INTEGER"), None);
        assert_eq!(declared_columns(""), None);
    }
}
