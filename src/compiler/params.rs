//! Select query parameters.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use super::filter::WhereClause;
use crate::sql::Value;

/// Sort direction. Anything other than `desc` (any case) sorts ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

impl From<String> for SortDir {
    fn from(s: String) -> Self {
        SortDir::from(s.as_str())
    }
}

impl From<&str> for SortDir {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            SortDir::Desc
        } else {
            SortDir::Asc
        }
    }
}

/// One `[field, direction]` entry of a multi-column order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct OrderTerm {
    pub field: String,
    pub direction: Option<SortDir>,
}

impl OrderTerm {
    pub fn new(field: impl Into<String>, direction: Option<SortDir>) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

impl TryFrom<Vec<String>> for OrderTerm {
    type Error = String;

    fn try_from(parts: Vec<String>) -> Result<Self, Self::Error> {
        let mut parts = parts.into_iter();
        let field = parts.next().ok_or("order term needs a field")?;
        let direction = parts.next().filter(|d| !d.is_empty()).map(SortDir::from);
        Ok(OrderTerm { field, direction })
    }
}

/// `orderBy` forms.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OrderBy {
    /// 1-based select-list position.
    Position(u32),
    /// A field, a `relation.field` path, or `LIST:field:a,b,c`.
    Field(String),
    Terms(Vec<OrderTerm>),
}

impl From<&str> for OrderBy {
    fn from(s: &str) -> Self {
        OrderBy::Field(s.to_string())
    }
}

impl From<String> for OrderBy {
    fn from(s: String) -> Self {
        OrderBy::Field(s)
    }
}

impl From<u32> for OrderBy {
    fn from(n: u32) -> Self {
        OrderBy::Position(n)
    }
}

impl From<Vec<OrderTerm>> for OrderBy {
    fn from(terms: Vec<OrderTerm>) -> Self {
        OrderBy::Terms(terms)
    }
}

/// Everything a select query can be asked for.
///
/// Deserializes from the camelCase parameter document; every key is
/// optional and `null` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectParams {
    /// Explicit field list; `None` selects every storable field.
    pub select: Option<Vec<String>>,
    pub where_clause: WhereClause,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub order: Option<SortDir>,
    pub order_by: Option<OrderBy>,
    /// Raw SQL appended after the compiled where clause.
    pub custom_where: Option<String>,
    /// Raw SQL appended after the compiled joins.
    pub custom_join: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub joins: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub left_joins: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub distinct: bool,
    /// Extra equality conditions per joined relation.
    #[serde(deserialize_with = "null_as_default")]
    pub join_conditions: HashMap<String, IndexMap<String, Value>>,
    /// Aggregate function name (`COUNT`, `SUM`, ...).
    pub aggregation: Option<String>,
    pub aggregation_by: Option<String>,
    pub group_by: Option<Vec<String>>,
    /// Join-table column → output alias, scoped to `relation_name`.
    #[serde(deserialize_with = "null_as_default")]
    pub additional_columns: IndexMap<String, String>,
    pub relation_name: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SelectParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter(mut self, clause: WhereClause) -> Self {
        self.where_clause = clause;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order(mut self, direction: SortDir) -> Self {
        self.order = Some(direction);
        self
    }

    pub fn order_by(mut self, order_by: impl Into<OrderBy>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn custom_where(mut self, sql: impl Into<String>) -> Self {
        self.custom_where = Some(sql.into());
        self
    }

    pub fn custom_join(mut self, sql: impl Into<String>) -> Self {
        self.custom_join = Some(sql.into());
        self
    }

    pub fn join(mut self, relation: impl Into<String>) -> Self {
        self.joins.push(relation.into());
        self
    }

    pub fn left_join(mut self, relation: impl Into<String>) -> Self {
        self.left_joins.push(relation.into());
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn join_condition(
        mut self,
        relation: impl Into<String>,
        column: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.join_conditions
            .entry(relation.into())
            .or_default()
            .insert(column.into(), value.into());
        self
    }

    pub fn aggregation(mut self, function: impl Into<String>, field: impl Into<String>) -> Self {
        self.aggregation = Some(function.into());
        self.aggregation_by = Some(field.into());
        self
    }

    pub fn group_by<I, S>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = Some(expressions.into_iter().map(Into::into).collect());
        self
    }

    pub fn additional_column(mut self, column: impl Into<String>, alias: impl Into<String>) -> Self {
        self.additional_columns.insert(column.into(), alias.into());
        self
    }

    pub fn relation_name(mut self, relation: impl Into<String>) -> Self {
        self.relation_name = Some(relation.into());
        self
    }
}
