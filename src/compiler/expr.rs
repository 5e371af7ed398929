//! Field expressions: `field`, `relation.field`, `FUNC:field`,
//! `FUNC:relation.field`.

use crate::metadata::{FieldDef, FieldKind, ForeignColumn};
use crate::sql::{DateBucket, SqlDialect, Token, TokenStream};

use super::naming::sanitize;
use super::{Diagnostic, QueryCompiler, Scope};

/// SQL functions a field expression may apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlFunction {
    Year,
    Month,
    Day,
    Sum,
    Count,
    Avg,
    Min,
    Max,
    /// Anything else is wrapped as `NAME(expr)`.
    Other(String),
}

impl SqlFunction {
    /// Parse a sanitized, case-insensitive function name.
    pub fn parse(name: &str) -> Option<Self> {
        let name = sanitize(name).to_uppercase();
        let function = match name.as_str() {
            "" => return None,
            "YEAR" => SqlFunction::Year,
            "MONTH" => SqlFunction::Month,
            "DAY" => SqlFunction::Day,
            "SUM" => SqlFunction::Sum,
            "COUNT" => SqlFunction::Count,
            "AVG" => SqlFunction::Avg,
            "MIN" => SqlFunction::Min,
            "MAX" => SqlFunction::Max,
            _ => SqlFunction::Other(name),
        };
        Some(function)
    }

    pub fn name(&self) -> &str {
        match self {
            SqlFunction::Year => "YEAR",
            SqlFunction::Month => "MONTH",
            SqlFunction::Day => "DAY",
            SqlFunction::Sum => "SUM",
            SqlFunction::Count => "COUNT",
            SqlFunction::Avg => "AVG",
            SqlFunction::Min => "MIN",
            SqlFunction::Max => "MAX",
            SqlFunction::Other(name) => name,
        }
    }

    /// `MONTH` and `DAY` become formatted date buckets; `YEAR` stays a plain call.
    fn date_bucket(&self) -> Option<DateBucket> {
        match self {
            SqlFunction::Month => Some(DateBucket::Month),
            SqlFunction::Day => Some(DateBucket::Day),
            _ => None,
        }
    }

    /// Aggregates that over-count under fan-out joins.
    fn is_additive(&self) -> bool {
        matches!(self, SqlFunction::Sum | SqlFunction::Count)
    }
}

/// A parsed, sanitized field expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExpression {
    pub function: Option<SqlFunction>,
    pub relation: Option<String>,
    pub field: String,
}

impl FieldExpression {
    /// Split on the first `:` and then the first `.`.
    ///
    /// A separator in position 0 is not a separator, so `:name` and `.name`
    /// are plain (sanitized) field names.
    pub fn parse(expression: &str) -> Self {
        let (function, rest) = split_prefix(expression, ':');
        let (relation, field) = split_prefix(rest, '.');

        Self {
            function: function.and_then(SqlFunction::parse),
            relation: relation.map(sanitize).filter(|r| !r.is_empty()),
            field: sanitize(field),
        }
    }

    /// Whether the raw text needs expression resolution rather than a
    /// plain field lookup.
    pub fn is_complex(expression: &str) -> bool {
        expression.contains('.') || expression.contains(':')
    }
}

fn split_prefix(s: &str, separator: char) -> (Option<&str>, &str) {
    match s.find(separator) {
        Some(i) if i > 0 => {
            let rest = &s[i + 1..];
            let rest = rest.split(separator).next().unwrap_or(rest);
            (Some(&s[..i]), rest)
        }
        _ => (None, s),
    }
}

impl QueryCompiler {
    /// Resolve a parsed expression to SQL within `scope`.
    pub(crate) fn resolve_in(&self, scope: &Scope, expr: &FieldExpression, distinct: bool) -> String {
        let column = self.columns.to_db(&expr.field);

        let path = match &expr.relation {
            Some(relation) => {
                let alias = scope.aliases.alias(relation).unwrap_or(relation.as_str());
                format!("{}.{}", alias, column)
            }
            None => match scope.entity.field(&expr.field).and_then(|f| f.select.as_deref()) {
                Some(template) => template.to_string(),
                None => format!("{}.{}", scope.table, column),
            },
        };

        match &expr.function {
            Some(function) => self.apply_function(scope, function, &path, distinct),
            None => path,
        }
    }

    fn apply_function(&self, scope: &Scope, function: &SqlFunction, path: &str, distinct: bool) -> String {
        let dialect = self.options.dialect;

        if let Some(bucket) = function.date_bucket() {
            return dialect.format_date_bucket(path, bucket).serialize(dialect);
        }

        let mut ts = TokenStream::new();
        ts.push(Token::FunctionName(function.name().to_string()))
            .lparen()
            .raw(path)
            .rparen();

        if distinct && function.is_additive() {
            let id = format!("{}.id", scope.table);
            ts.space()
                .push(Token::Mul)
                .space()
                .push(Token::FunctionName("COUNT".into()))
                .lparen()
                .push(Token::Distinct)
                .space()
                .raw(id.as_str())
                .rparen()
                .space()
                .push(Token::Div)
                .space()
                .push(Token::FunctionName("COUNT".into()))
                .lparen()
                .raw(id.as_str())
                .rparen();
        }

        ts.serialize(dialect)
    }

    /// Column path of a declared field, or `None` when it has no column.
    ///
    /// Foreign fields read through their relation's alias; a missing alias
    /// is recorded on the scope.
    pub(crate) fn field_path(&self, scope: &mut Scope, name: &str, field: &FieldDef) -> Option<String> {
        match &field.kind {
            FieldKind::NotStorable => None,
            FieldKind::Column => Some(format!("{}.{}", scope.table, self.columns.to_db(&sanitize(name)))),
            FieldKind::Foreign { relation, foreign } => self.foreign_path(scope, relation, foreign),
        }
    }

    fn foreign_path(&self, scope: &mut Scope, relation: &str, foreign: &ForeignColumn) -> Option<String> {
        let Some(alias) = scope.aliases.alias(relation).map(str::to_string) else {
            scope.diagnose(Diagnostic::UnresolvedAlias {
                relation: relation.to_string(),
            });
            return None;
        };

        let path = match foreign {
            ForeignColumn::Single(column) => format!("{}.{}", alias, self.columns.to_db(column)),
            ForeignColumn::Concat(parts) => {
                let parts: Vec<String> = parts
                    .iter()
                    .map(|part| {
                        if part == " " {
                            "' '".to_string()
                        } else {
                            format!("{}.{}", alias, self.columns.to_db(part))
                        }
                    })
                    .collect();
                format!("TRIM(CONCAT({}))", parts.join(", "))
            }
        };
        Some(path)
    }
}
