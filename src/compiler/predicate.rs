//! Where-clause compilation.

use std::sync::Arc;

use crate::metadata::FieldKind;
use crate::sql::SqlDialect;

use super::expr::FieldExpression;
use super::filter::{BoolOp, FilterValue, WhereClause, WhereItem};
use super::naming::sanitize;
use super::{Diagnostic, QueryCompiler, Scope};

/// Comparison operator embedded in a filter key (`amount>=`, `name*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    Like,
    GreaterOrEqual,
    LessOrEqual,
    Greater,
    Less,
}

/// Checked in this order; the first token found in the key wins.
const SCAN_ORDER: [(&str, ComparisonOp); 7] = [
    ("!=", ComparisonOp::NotEqual),
    ("*", ComparisonOp::Like),
    (">=", ComparisonOp::GreaterOrEqual),
    ("<=", ComparisonOp::LessOrEqual),
    (">", ComparisonOp::Greater),
    ("<", ComparisonOp::Less),
    ("=", ComparisonOp::Equal),
];

impl ComparisonOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "<>",
            ComparisonOp::Like => "LIKE",
            ComparisonOp::GreaterOrEqual => ">=",
            ComparisonOp::LessOrEqual => "<=",
            ComparisonOp::Greater => ">",
            ComparisonOp::Less => "<",
        }
    }

    /// Split a filter key into field name and operator.
    ///
    /// Purely alphanumeric keys are never scanned. Otherwise every
    /// occurrence of the first matching token is removed and the rest
    /// trimmed.
    pub fn split(key: &str) -> (String, ComparisonOp) {
        if !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return (key.to_string(), ComparisonOp::Equal);
        }
        for (token, op) in SCAN_ORDER {
            if key.contains(token) {
                return (key.replace(token, "").trim().to_string(), op);
            }
        }
        (key.to_string(), ComparisonOp::Equal)
    }
}

impl QueryCompiler {
    /// Compile `clause` with siblings joined by `op`. Empty groups vanish.
    pub(crate) fn compile_where_in(&self, scope: &mut Scope, clause: &WhereClause, op: BoolOp) -> String {
        let mut parts = Vec::new();

        for item in clause.items() {
            match item {
                WhereItem::Group { op: inner_op, clause } => {
                    let inner = self.compile_where_in(scope, clause, *inner_op);
                    if !inner.is_empty() {
                        parts.push(format!("({})", inner));
                    }
                }
                WhereItem::Condition { key, value } => {
                    if let Some(predicate) = self.compile_condition(scope, key, value) {
                        parts.push(predicate);
                    }
                }
            }
        }

        parts.join(&format!(" {} ", op.as_str()))
    }

    fn compile_condition(&self, scope: &mut Scope, key: &str, value: &FilterValue) -> Option<String> {
        let (field, op) = ComparisonOp::split(key);

        let left = if FieldExpression::is_complex(&field) {
            self.resolve_in(scope, &FieldExpression::parse(&field), false)
        } else {
            let entity = Arc::clone(&scope.entity);
            let Some(def) = entity.field(&field) else {
                scope.diagnose(Diagnostic::UnknownWhereField { field });
                return None;
            };

            if let Some(template) = def.where_template(op.as_sql()) {
                return Some(template.replace("{value}", &self.quote_filter(value)));
            }

            match def.kind {
                FieldKind::Foreign { .. } => self.field_path(scope, &field, def)?,
                _ => format!("{}.{}", scope.table, self.columns.to_db(&sanitize(&field))),
            }
        };

        match value {
            FilterValue::Scalar(v) if v.is_null() => match op {
                ComparisonOp::Equal => Some(format!("{} IS NULL", left)),
                ComparisonOp::NotEqual => Some(format!("{} IS NOT NULL", left)),
                _ => {
                    scope.diagnose(Diagnostic::DroppedNullComparison {
                        field,
                        operator: op.as_sql().to_string(),
                    });
                    None
                }
            },
            FilterValue::Scalar(v) => Some(format!("{} {} {}", left, op.as_sql(), self.escaper.quote(v))),
            FilterValue::List(values) if values.is_empty() => {
                Some(self.options.dialect.false_predicate().to_string())
            }
            FilterValue::List(values) => {
                let negate = if op == ComparisonOp::NotEqual { "NOT " } else { "" };
                let quoted: Vec<String> = values.iter().map(|v| self.escaper.quote(v)).collect();
                Some(format!("{} {}IN ({})", left, negate, quoted.join(",")))
            }
        }
    }

    /// Value text substituted into a field's `where` template.
    fn quote_filter(&self, value: &FilterValue) -> String {
        match value {
            FilterValue::Scalar(v) => self.escaper.quote(v),
            FilterValue::List(values) => values
                .iter()
                .map(|v| self.escaper.quote(v))
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}
