//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for the few places where
//! compiled queries differ between databases:
//!
//! - Identifier quoting: `` ` `` (MySQL), `"` (PostgreSQL)
//! - String literal escaping: MySQL treats `\` as an escape character
//! - Pagination: `LIMIT offset, limit` vs `LIMIT limit OFFSET offset`
//! - Date bucketing: `DATE_FORMAT()` vs `TO_CHAR()`
//! - Custom value ordering: `FIELD()` vs `CASE`
//!
//! Everything else in the compiler is backend-agnostic.
//!
//! # Usage
//!
//! ```ignore
//! use quarry::sql::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::MySql;
//! let quoted = dialect.quote_identifier("lead");  // `lead`
//! ```

pub mod helpers;
mod mysql;
mod postgres;

pub use mysql::MySql;
pub use postgres::Postgres;

use std::str::FromStr;

use super::token::TokenStream;
use super::value::{Value, ValueEscaper};

/// Granularity of a date-bucketing function (`MONTH:createdAt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBucket {
    Month,
    Day,
}

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, alias).
    ///
    /// - PostgreSQL: `"identifier"`
    /// - MySQL: `` `identifier` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// Declare a table alias after `AS`.
    ///
    /// Column paths reference aliases unquoted (`assignedUser.id`), so the
    /// declaration must fold the same way the reference does.
    fn quote_alias(&self, alias: &str) -> String {
        self.quote_identifier(alias)
    }

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    ///
    /// - PostgreSQL: `true`/`false`
    /// - MySQL: `1`/`0`
    fn format_bool(&self, b: bool) -> &'static str;

    /// Format a NULL literal.
    fn format_null(&self) -> &'static str {
        "NULL"
    }

    /// Predicate that is never satisfied (stands in for an empty `IN ()`).
    ///
    /// - MySQL: `0` (default)
    /// - PostgreSQL: `FALSE`
    fn false_predicate(&self) -> &'static str {
        "0"
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit the pagination clause.
    ///
    /// Nothing is emitted unless both values are present; callers default a
    /// missing offset to 0 when a limit is given.
    ///
    /// - PostgreSQL: `LIMIT n OFFSET m` (default)
    /// - MySQL: `LIMIT m, n` (override)
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_standard(limit, offset)
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Format a date/datetime expression as a sortable bucket string.
    ///
    /// - PostgreSQL: `TO_CHAR(expr, 'YYYY-MM')` (default)
    /// - MySQL: `DATE_FORMAT(expr, '%Y-%m')`
    fn format_date_bucket(&self, expr: &str, bucket: DateBucket) -> TokenStream {
        helpers::emit_to_char(expr, bucket)
    }

    /// Order by position of `expr` within an explicit value list.
    ///
    /// Values are already quoted. Unlisted values rank as 0, so they sort
    /// first in ascending order.
    ///
    /// - PostgreSQL: `CASE expr WHEN v1 THEN 1 ... ELSE 0 END` (default)
    /// - MySQL: `FIELD(expr, v1, v2, ...)`
    fn emit_value_order(&self, expr: &str, values: &[String]) -> TokenStream {
        helpers::emit_value_order_case(expr, values)
    }

    /// Remap a function name for this dialect.
    ///
    /// Returns `Some(new_name)` if the function should be remapped, `None` to keep it as is.
    /// The input is matched case-insensitively.
    fn remap_function(&self, name: &str) -> Option<&'static str> {
        let _ = name;
        None
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    MySql,
    Postgres,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::MySql => &MySql,
            Dialect::Postgres => &Postgres,
        }
    }

    /// Append the pagination clause to a finished statement.
    pub fn apply_limit(&self, mut sql: String, offset: Option<u64>, limit: Option<u64>) -> String {
        let ts = self.emit_limit_offset(limit, offset);
        if !ts.is_empty() {
            sql.push(' ');
            sql.push_str(&ts.serialize(*self));
        }
        sql
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_alias(&self, alias: &str) -> String {
        self.dialect().quote_alias(alias)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn format_null(&self) -> &'static str {
        self.dialect().format_null()
    }

    fn false_predicate(&self) -> &'static str {
        self.dialect().false_predicate()
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }

    fn format_date_bucket(&self, expr: &str, bucket: DateBucket) -> TokenStream {
        self.dialect().format_date_bucket(expr, bucket)
    }

    fn emit_value_order(&self, expr: &str, values: &[String]) -> TokenStream {
        self.dialect().emit_value_order(expr, values)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        self.dialect().remap_function(name)
    }
}

/// Every dialect quotes values the way its driver's `quote()` would.
impl ValueEscaper for Dialect {
    fn quote(&self, value: &Value) -> String {
        match value {
            Value::Null => self.format_null().to_string(),
            Value::Bool(b) => self.quote_string(self.format_bool(*b)),
            Value::Int(n) => self.quote_string(&n.to_string()),
            Value::Float(f) => {
                let mut buffer = ryu::Buffer::new();
                self.quote_string(buffer.format(*f))
            }
            Value::Text(s) => self.quote_string(s),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pgsql" => Ok(Dialect::Postgres),
            other => Err(format!("unsupported dialect: {}", other)),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
