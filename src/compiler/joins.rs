//! Join planning.
//!
//! Joins are emitted in three runs: automatic belongs-to `LEFT JOIN`s for
//! foreign fields, then the caller's `joins` (inner), then `leftJoins`.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::metadata::{FieldDef, RelationDef, RelationKind};
use crate::sql::{Dialect, Token, TokenStream, Value};

use super::keys::RelationKeys;
use super::naming::sanitize;
use super::params::SelectParams;
use super::{CompileError, CompileResult, Diagnostic, QueryCompiler, Scope};

/// Type of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

/// A JOIN clause: `[LEFT ]JOIN `table` AS `alias` ON p1 AND p2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: String,
    pub alias: String,
    /// Predicates combined with `AND`.
    pub on: Vec<String>,
}

impl JoinClause {
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        if self.join_type == JoinType::Left {
            ts.push(Token::Left).space();
        }

        ts.push(Token::Join)
            .space()
            .push(Token::Ident(self.table.clone()))
            .space()
            .push(Token::As)
            .space()
            .push(Token::TableAlias(self.alias.clone()));

        for (i, predicate) in self.on.iter().enumerate() {
            ts.space();
            if i == 0 {
                ts.push(Token::On);
            } else {
                ts.push(Token::And);
            }
            ts.space().raw(predicate.as_str());
        }

        ts
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens().serialize(dialect)
    }
}

impl QueryCompiler {
    /// All joins for a select, in emission order.
    pub(crate) fn plan_joins_in(&self, scope: &mut Scope, params: &SelectParams) -> CompileResult<Vec<JoinClause>> {
        let explicit: Vec<&str> = params
            .joins
            .iter()
            .chain(params.left_joins.iter())
            .map(String::as_str)
            .collect();

        let mut clauses = self.belongs_to_joins(scope, params.select.as_deref(), &explicit);

        for (relations, join_type) in [(&params.joins, JoinType::Inner), (&params.left_joins, JoinType::Left)] {
            for relation in relations {
                let conditions = params.join_conditions.get(relation);
                clauses.extend(self.relation_joins(scope, relation, join_type, conditions)?);
            }
        }

        Ok(clauses)
    }

    /// `LEFT JOIN`s for belongs-to relations.
    ///
    /// With an explicit select list only relations read by a selected
    /// foreign field are joined.
    fn belongs_to_joins(&self, scope: &mut Scope, select: Option<&[String]>, skip: &[&str]) -> Vec<JoinClause> {
        let entity = Arc::clone(&scope.entity);

        let wanted: Option<HashSet<&str>> = match select {
            Some(fields) if !fields.is_empty() => Some(
                fields
                    .iter()
                    .filter_map(|f| entity.field(f))
                    .filter_map(FieldDef::foreign_relation)
                    .collect(),
            ),
            _ => None,
        };

        let mut clauses = Vec::new();
        for (name, relation) in &entity.relations {
            if relation.kind != RelationKind::BelongsTo || relation.no_join {
                continue;
            }
            if skip.contains(&name.as_str()) {
                continue;
            }
            if wanted.as_ref().is_some_and(|w| !w.contains(name.as_str())) {
                continue;
            }
            if let Some(clause) = self.belongs_to_join(scope, name, relation, JoinType::Left) {
                clauses.push(clause);
            }
        }
        clauses
    }

    fn belongs_to_join(
        &self,
        scope: &mut Scope,
        name: &str,
        relation: &RelationDef,
        join_type: JoinType,
    ) -> Option<JoinClause> {
        let alias = self.relation_alias(scope, name)?;
        let keys = RelationKeys::resolve(&scope.entity.name, name, relation);

        Some(JoinClause {
            join_type,
            table: self.columns.to_db(&relation.entity),
            on: vec![format!(
                "{}.{} = {}.{}",
                scope.table,
                self.columns.to_db(&keys.key),
                alias,
                self.columns.to_db(&keys.foreign_key)
            )],
            alias,
        })
    }

    /// Joins for one explicitly requested relation.
    fn relation_joins(
        &self,
        scope: &mut Scope,
        name: &str,
        join_type: JoinType,
        conditions: Option<&IndexMap<String, Value>>,
    ) -> CompileResult<Vec<JoinClause>> {
        let entity = Arc::clone(&scope.entity);
        let Some(relation) = entity.relation(name) else {
            scope.diagnose(Diagnostic::UnknownRelation {
                relation: name.to_string(),
            });
            return Ok(vec![]);
        };

        let joins = match relation.kind {
            RelationKind::BelongsTo => self
                .belongs_to_join(scope, name, relation, join_type)
                .into_iter()
                .collect(),
            RelationKind::HasMany | RelationKind::HasChildren => self
                .has_many_join(scope, name, relation, join_type, conditions)
                .into_iter()
                .collect(),
            RelationKind::ManyMany => self.many_many_joins(scope, name, relation, join_type, conditions)?,
        };
        Ok(joins)
    }

    fn has_many_join(
        &self,
        scope: &mut Scope,
        name: &str,
        relation: &RelationDef,
        join_type: JoinType,
        conditions: Option<&IndexMap<String, Value>>,
    ) -> Option<JoinClause> {
        let alias = self.relation_alias(scope, name)?;
        let keys = RelationKeys::resolve(&scope.entity.name, name, relation);

        let mut on = vec![
            format!(
                "{}.{} = {}.{}",
                scope.table,
                self.columns.to_db(&keys.key),
                alias,
                self.columns.to_db(&keys.foreign_key)
            ),
            self.not_deleted(&alias),
        ];
        if let Some(foreign_type) = &keys.foreign_type {
            on.push(self.equality(&alias, foreign_type, &Value::Text(scope.entity.name.clone())));
        }
        for (column, value) in conditions.into_iter().flatten() {
            on.push(self.equality(&alias, column, value));
        }

        Some(JoinClause {
            join_type,
            table: self.columns.to_db(&relation.entity),
            alias,
            on,
        })
    }

    /// Owner → join table → target.
    fn many_many_joins(
        &self,
        scope: &mut Scope,
        name: &str,
        relation: &RelationDef,
        join_type: JoinType,
        conditions: Option<&IndexMap<String, Value>>,
    ) -> CompileResult<Vec<JoinClause>> {
        let keys = RelationKeys::resolve(&scope.entity.name, name, relation);
        let missing_table = || CompileError::MissingJoinTable {
            entity: scope.entity.name.clone(),
            relation: name.to_string(),
        };
        let middle_table = relation.relation_name.as_deref().ok_or_else(missing_table)?;
        let (near, distant) = keys.mid_keys.clone().ok_or_else(missing_table)?;

        let Some(alias) = self.relation_alias(scope, name) else {
            return Ok(vec![]);
        };
        let Some(middle_alias) = scope.aliases.middle_alias(name).map(str::to_string) else {
            scope.diagnose(Diagnostic::UnresolvedAlias {
                relation: name.to_string(),
            });
            return Ok(vec![]);
        };

        // Static conditions override call-supplied ones with the same column.
        let mut merged = conditions.cloned().unwrap_or_default();
        for (column, value) in &relation.conditions {
            merged.insert(column.clone(), value.clone());
        }

        let mut middle_on = vec![
            format!(
                "{}.{} = {}.{}",
                scope.table,
                self.columns.to_db(&keys.key),
                middle_alias,
                self.columns.to_db(&near)
            ),
            self.not_deleted(&middle_alias),
        ];
        for (column, value) in &merged {
            middle_on.push(self.equality(&middle_alias, column, value));
        }

        let target_on = vec![
            format!(
                "{}.{} = {}.{}",
                alias,
                self.columns.to_db(&keys.foreign_key),
                middle_alias,
                self.columns.to_db(&distant)
            ),
            self.not_deleted(&alias),
        ];

        Ok(vec![
            JoinClause {
                join_type,
                table: self.columns.to_db(middle_table),
                alias: middle_alias,
                on: middle_on,
            },
            JoinClause {
                join_type,
                table: self.columns.to_db(&relation.entity),
                alias,
                on: target_on,
            },
        ])
    }

    fn relation_alias(&self, scope: &mut Scope, name: &str) -> Option<String> {
        match scope.aliases.alias(name) {
            Some(alias) => Some(alias.to_string()),
            None => {
                scope.diagnose(Diagnostic::UnresolvedAlias {
                    relation: name.to_string(),
                });
                None
            }
        }
    }

    fn not_deleted(&self, alias: &str) -> String {
        format!("{}.deleted = {}", alias, self.escaper.quote(&Value::Int(0)))
    }

    fn equality(&self, alias: &str, column: &str, value: &Value) -> String {
        let column = self.columns.to_db(&sanitize(column));
        if value.is_null() {
            format!("{}.{} IS NULL", alias, column)
        } else {
            format!("{}.{} = {}", alias, column, self.escaper.quote(value))
        }
    }
}
