//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features:
//! - ANSI identifier quoting (`"`)
//! - Standard-conforming string literals (no backslash escapes)
//! - Native boolean type (true/false)
//! - LIMIT ... OFFSET ... for pagination
//! - TO_CHAR() for date bucketing
//! - Integers are not booleans, so the empty-list predicate is FALSE

use super::helpers;
use super::SqlDialect;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    // Unquoted so `AS assignedUser` and `assignedUser.id` both fold to
    // lower case.
    fn quote_alias(&self, alias: &str) -> String {
        alias.to_string()
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn false_predicate(&self) -> &'static str {
        "FALSE"
    }

    // Uses default emit_limit_offset (LIMIT ... OFFSET ...),
    // format_date_bucket (TO_CHAR) and emit_value_order (CASE)

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_postgres(name)
    }
}
