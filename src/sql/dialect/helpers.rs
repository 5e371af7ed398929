//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use super::super::token::{Token, TokenStream};
use super::DateBucket;

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
/// Used by: Postgres
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote string for MySQL, where `\` starts an escape sequence unless
/// NO_BACKSLASH_ESCAPES is set.
pub fn quote_string_backslash(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("''"),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

// =============================================================================
// Boolean Formatting
// =============================================================================

/// Format boolean as literal true/false.
/// Used by: Postgres
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Format boolean as numeric 1/0.
/// Used by: MySQL
pub fn format_bool_numeric(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Emit LIMIT ... OFFSET ... (standard SQL).
/// Used by: Postgres
pub fn emit_limit_offset_standard(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    if let (Some(lim), Some(off)) = (limit, offset) {
        ts.push(Token::Limit)
            .space()
            .push(Token::LitInt(lim as i64))
            .space()
            .push(Token::Offset)
            .space()
            .push(Token::LitInt(off as i64));
    }

    ts
}

/// Emit LIMIT offset, limit.
/// Used by: MySQL
pub fn emit_limit_offset_comma(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    if let (Some(lim), Some(off)) = (limit, offset) {
        ts.push(Token::Limit)
            .space()
            .push(Token::LitInt(off as i64))
            .comma()
            .space()
            .push(Token::LitInt(lim as i64));
    }

    ts
}

// =============================================================================
// Date Bucketing
// =============================================================================

/// Emit `TO_CHAR(expr, 'YYYY-MM')`.
/// Used by: Postgres
pub fn emit_to_char(expr: &str, bucket: DateBucket) -> TokenStream {
    let pattern = match bucket {
        DateBucket::Month => "YYYY-MM",
        DateBucket::Day => "YYYY-MM-DD",
    };
    emit_format_call("TO_CHAR", expr, pattern)
}

/// Emit `DATE_FORMAT(expr, '%Y-%m')`.
/// Used by: MySQL
pub fn emit_date_format(expr: &str, bucket: DateBucket) -> TokenStream {
    let pattern = match bucket {
        DateBucket::Month => "%Y-%m",
        DateBucket::Day => "%Y-%m-%d",
    };
    emit_format_call("DATE_FORMAT", expr, pattern)
}

fn emit_format_call(function: &str, expr: &str, pattern: &str) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName(function.into()))
        .lparen()
        .raw(expr)
        .comma()
        .space()
        .push(Token::LitString(pattern.into()))
        .rparen();
    ts
}

// =============================================================================
// Value-List Ordering
// =============================================================================

/// Emit `FIELD(expr, v1, v2, ...)`.
/// Used by: MySQL
pub fn emit_value_order_field(expr: &str, values: &[String]) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName("FIELD".into())).lparen().raw(expr);
    for value in values {
        ts.comma().space().raw(value.as_str());
    }
    ts.rparen();
    ts
}

/// Emit `CASE expr WHEN v1 THEN 1 ... ELSE 0 END`.
/// Used by: Postgres
pub fn emit_value_order_case(expr: &str, values: &[String]) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::Case).space().raw(expr);
    for (i, value) in values.iter().enumerate() {
        ts.space()
            .push(Token::When)
            .space()
            .raw(value.as_str())
            .space()
            .push(Token::Then)
            .space()
            .push(Token::LitInt(i as i64 + 1));
    }
    ts.space()
        .push(Token::Else)
        .space()
        .push(Token::LitInt(0))
        .space()
        .push(Token::End);
    ts
}

// =============================================================================
// Function Remapping
// =============================================================================

/// Remap functions for Postgres dialect.
///
/// Only renames that keep the argument list intact.
pub fn remap_function_postgres(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "NVL" => Some("COALESCE"),
        "IFNULL" => Some("COALESCE"),
        "ISNULL" => Some("COALESCE"),
        _ => None,
    }
}

/// Remap functions for MySQL dialect.
///
/// `ISNULL` is left alone: MySQL has its own one-argument `ISNULL`.
pub fn remap_function_mysql(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "NVL" => Some("IFNULL"),
        "SUBSTR" => Some("SUBSTRING"),
        _ => None,
    }
}
