//! MySQL SQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - Boolean is TINYINT(1), returns 1/0
//! - Backslash escapes inside string literals
//! - LIMIT offset, count for pagination
//! - DATE_FORMAT() for date bucketing
//! - FIELD() for custom value ordering

use super::helpers;
use super::{DateBucket, SqlDialect};
use crate::sql::token::TokenStream;

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_backslash(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_comma(limit, offset)
    }

    fn format_date_bucket(&self, expr: &str, bucket: DateBucket) -> TokenStream {
        helpers::emit_date_format(expr, bucket)
    }

    fn emit_value_order(&self, expr: &str, values: &[String]) -> TokenStream {
        helpers::emit_value_order_field(expr, values)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_mysql(name)
    }
}
