//! SQL quoting utilities
//!
//! Extract paths and source headers are interpolated into DuckDB statements
//! (table functions such as `read_parquet` do not take bound parameters), so
//! every interpolated value goes through one of these helpers.

/// Quote a SQL identifier.
///
/// Wraps the identifier in double quotes and escapes any embedded double quotes
/// by doubling them, following the SQL standard.
///
/// # Examples
/// ```
/// use herd_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("herd_name"), r#""herd_name""#);
/// assert_eq!(quote_ident("dau*"), r#""dau*""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a potentially schema-qualified name (e.g. `staging.population`).
///
/// # Examples
/// ```
/// use herd_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("harvest"), r#""harvest""#);
/// assert_eq!(quote_qualified("staging.population"), r#""staging"."population""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render a value as a complete single-quoted SQL string literal.
pub fn string_literal(value: &str) -> String {
    format!("'{}'", escape_sql_string(value))
}
