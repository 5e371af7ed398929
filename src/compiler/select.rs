//! Select statement composition.

use std::sync::Arc;

use crate::sql::{SqlDialect, Token, TokenStream, Value};

use super::expr::{FieldExpression, SqlFunction};
use super::filter::BoolOp;
use super::naming::sanitize;
use super::params::{OrderBy, SelectParams, SortDir};
use super::{CompileError, CompileResult, CompiledQuery, Diagnostic, QueryCompiler, Scope};

/// Output alias of an aggregation query's single column.
const AGGREGATE_ALIAS: &str = "AggregateValue";

impl QueryCompiler {
    /// Compile a full `SELECT` for `entity_type`.
    ///
    /// Unless `include_deleted` is set, `deleted = 0` is put ahead of the
    /// caller's filter; a top-level `deleted` condition from the caller wins.
    pub fn build_select(
        &self,
        entity_type: &str,
        params: &SelectParams,
        include_deleted: bool,
    ) -> CompileResult<CompiledQuery> {
        let dialect = self.options.dialect;
        let mut scope = self.scope(entity_type)?;

        let mut where_clause = params.where_clause.clone();
        if !include_deleted && !where_clause.contains_key("deleted") {
            where_clause.prepend("deleted", 0);
        }

        let aggregation = params.aggregation.as_deref().filter(|a| !a.is_empty());

        let (select_part, order_part) = match aggregation {
            Some(function) => (self.aggregation_select(&scope, function, params)?, None),
            None => {
                let select = self.select_list(&mut scope, params)?;
                let order = self.order_clause(&mut scope, params);
                (select, order)
            }
        };

        let mut joins: Vec<String> = self
            .plan_joins_in(&mut scope, params)?
            .iter()
            .map(|join| join.to_sql(dialect))
            .collect();
        if let Some(custom) = non_empty(&params.custom_join) {
            joins.push(custom.to_string());
        }

        let mut where_part = self.compile_where_in(&mut scope, &where_clause, BoolOp::And);
        if let Some(custom) = non_empty(&params.custom_where) {
            if where_part.is_empty() {
                where_part = strip_leading_connective(custom.trim()).to_string();
            } else {
                where_part.push(' ');
                where_part.push_str(custom);
            }
        }

        let group_part = match aggregation {
            Some(_) => None,
            None => self.group_by_clause(&scope, params),
        };

        let mut ts = TokenStream::new();
        ts.push(Token::Select)
            .space()
            .raw(select_part)
            .space()
            .push(Token::From)
            .space()
            .push(Token::Ident(scope.table.clone()));

        if !joins.is_empty() {
            ts.space().raw(joins.join(" "));
        }
        if !where_part.is_empty() {
            ts.space().push(Token::Where).space().raw(where_part);
        }
        if let Some(group) = group_part {
            ts.space().push(Token::GroupBy).space().raw(group);
        }
        if let Some(order) = order_part {
            ts.space().push(Token::OrderBy).space().raw(order);
        }

        let mut sql = ts.serialize(dialect);
        if aggregation.is_none() {
            let offset = params.offset.or(params.limit.map(|_| 0));
            sql = dialect.apply_limit(sql, offset, params.limit);
        }

        self.finish(scope, sql)
    }

    /// `path AS `name`` terms for the requested (or every) field.
    fn select_list(&self, scope: &mut Scope, params: &SelectParams) -> CompileResult<String> {
        let dialect = self.options.dialect;
        let entity = Arc::clone(&scope.entity);

        let names: Vec<&str> = match &params.select {
            Some(fields) if !fields.is_empty() => fields.iter().map(String::as_str).collect(),
            _ => entity.fields.keys().map(String::as_str).collect(),
        };

        let mut terms = Vec::new();
        for name in names {
            let path = match entity.field(name) {
                Some(def) => match &def.select {
                    Some(template) => Some(template.clone()),
                    None => self.field_path(scope, name, def),
                },
                None if FieldExpression::is_complex(name) => {
                    Some(self.resolve_in(scope, &FieldExpression::parse(name), params.distinct))
                }
                None => {
                    scope.diagnose(Diagnostic::DroppedSelectField {
                        field: name.to_string(),
                    });
                    None
                }
            };
            if let Some(path) = path {
                terms.push(format!("{} AS {}", path, dialect.quote_identifier(name)));
            }
        }

        if let Some(relation) = non_empty(&params.relation_name) {
            let table = dialect.quote_identifier(&self.columns.to_db(&sanitize(relation)));
            for (column, alias) in &params.additional_columns {
                terms.push(format!(
                    "{}.{} AS {}",
                    table,
                    self.columns.to_db(&sanitize(column)),
                    dialect.quote_identifier(alias)
                ));
            }
        }

        if terms.is_empty() {
            return Err(CompileError::EmptySelect {
                entity: entity.name.clone(),
            });
        }
        Ok(terms.join(", "))
    }

    /// `FUNC([DISTINCT ]table.column) AS AggregateValue`.
    fn aggregation_select(&self, scope: &Scope, function: &str, params: &SelectParams) -> CompileResult<String> {
        let field = params.aggregation_by.as_deref().unwrap_or_default();
        if scope.entity.field(field).is_none() {
            return Err(CompileError::UnknownAggregationField {
                entity: scope.entity.name.clone(),
                field: field.to_string(),
            });
        }
        let function = SqlFunction::parse(function)
            .ok_or_else(|| CompileError::UnsupportedAggregation(function.to_string()))?;

        let mut ts = TokenStream::new();
        ts.push(Token::FunctionName(function.name().to_string())).lparen();
        if params.distinct && function == SqlFunction::Count {
            ts.push(Token::Distinct).space();
        }
        ts.raw(format!("{}.{}", scope.table, self.columns.to_db(&sanitize(field))))
            .rparen()
            .space()
            .push(Token::As)
            .space()
            .raw(AGGREGATE_ALIAS);

        Ok(ts.serialize(self.options.dialect))
    }

    fn group_by_clause(&self, scope: &Scope, params: &SelectParams) -> Option<String> {
        match &params.group_by {
            Some(expressions) if !expressions.is_empty() => Some(
                expressions
                    .iter()
                    .map(|e| self.resolve_in(scope, &FieldExpression::parse(e), false))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ if params.distinct => Some(format!(
                "{}.id",
                self.options.dialect.quote_identifier(&scope.table)
            )),
            _ => None,
        }
    }

    fn order_clause(&self, scope: &mut Scope, params: &SelectParams) -> Option<String> {
        match params.order_by.as_ref()? {
            OrderBy::Position(n) => Some(format!("{} {}", n, params.order.unwrap_or_default().as_str())),
            OrderBy::Field(field) => self.order_term(scope, field, params.order.unwrap_or_default()),
            OrderBy::Terms(terms) => {
                let parts: Vec<String> = terms
                    .iter()
                    .filter_map(|t| self.order_term(scope, &t.field, t.direction.unwrap_or_default()))
                    .collect();
                (!parts.is_empty()).then(|| parts.join(", "))
            }
        }
    }

    /// One ORDER BY term: `LIST:field:a,b`, a field template, or a path.
    fn order_term(&self, scope: &mut Scope, field: &str, direction: SortDir) -> Option<String> {
        let dialect = self.options.dialect;

        if let Some(rest) = field.strip_prefix("LIST:") {
            let mut parts = rest.splitn(2, ':');
            let field = parts.next().unwrap_or_default();
            let values: Vec<String> = parts
                .next()
                .unwrap_or_default()
                .split(',')
                .map(|v| self.escaper.quote(&Value::from(v)))
                .collect();
            let path = self.order_path(scope, field)?;
            let expr = dialect.emit_value_order(&path, &values).serialize(dialect);
            return Some(format!("{} {}", expr, direction.as_str()));
        }

        if let Some(template) = scope.entity.field(field).and_then(|f| f.order_by.as_deref()) {
            return Some(template.replace("{direction}", direction.as_str()));
        }

        let path = self.order_path(scope, field)?;
        Some(format!("{} {}", path, direction.as_str()))
    }

    fn order_path(&self, scope: &mut Scope, field: &str) -> Option<String> {
        if let Some((relation, column)) = field.split_once('.') {
            let (relation, column) = (sanitize(relation), sanitize(column));
            if relation.is_empty() || column.is_empty() {
                scope.diagnose(Diagnostic::UnknownOrderField {
                    field: field.to_string(),
                });
                return None;
            }
            let alias = match scope.aliases.alias(&relation) {
                Some(alias) => alias.to_string(),
                None => self.columns.to_db(&relation),
            };
            return Some(format!("{}.{}", alias, self.columns.to_db(&column)));
        }

        let entity = Arc::clone(&scope.entity);
        match entity.field(field) {
            Some(def) => self.field_path(scope, field, def),
            None => {
                scope.diagnose(Diagnostic::UnknownOrderField {
                    field: field.to_string(),
                });
                None
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// `AND x = 1` → `x = 1`, for raw SQL that would otherwise open the clause.
fn strip_leading_connective(sql: &str) -> &str {
    for connective in ["AND ", "OR "] {
        let head = sql.get(..connective.len());
        if head.is_some_and(|h| h.eq_ignore_ascii_case(connective)) {
            return sql[connective.len()..].trim_start();
        }
    }
    sql
}
