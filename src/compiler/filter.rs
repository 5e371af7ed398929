//! Nested boolean filter trees (`whereClause`).
//!
//! A filter is an ordered list of items. Each item is either a leaf
//! condition (`"status" => ["New", "Assigned"]`, `"amount>=" => 100`) or a
//! nested group joined by `AND`/`OR`. In documents, `"AND"`/`"OR"` keys
//! open a group, and so do integer keys and array elements (combined
//! with `AND`).

use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::sql::Value;

/// Boolean connective for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolOp {
    #[default]
    And,
    Or,
}

impl BoolOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "AND" => Some(BoolOp::And),
            "OR" => Some(BoolOp::Or),
            _ if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) => Some(BoolOp::And),
            _ => None,
        }
    }
}

/// Right-hand side of a leaf condition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    List(Vec<Value>),
    Scalar(Value),
}

impl From<Value> for FilterValue {
    fn from(v: Value) -> Self {
        FilterValue::Scalar(v)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Scalar(s.into())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Scalar(s.into())
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Scalar(n.into())
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        FilterValue::Scalar(n.into())
    }
}

impl From<f64> for FilterValue {
    fn from(f: f64) -> Self {
        FilterValue::Scalar(f.into())
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Scalar(b.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for FilterValue {
    fn from(opt: Option<T>) -> Self {
        FilterValue::Scalar(opt.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WhereItem {
    /// `key` may carry an operator suffix (`amount>=`, `name*`).
    Condition { key: String, value: FilterValue },
    Group { op: BoolOp, clause: WhereClause },
}

/// An ordered filter tree. Siblings are combined with the enclosing
/// group's operator (`AND` at the top level).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    items: Vec<WhereItem>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf condition.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.items.push(WhereItem::Condition {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Add a nested group.
    pub fn group(mut self, op: BoolOp, clause: WhereClause) -> Self {
        self.items.push(WhereItem::Group { op, clause });
        self
    }

    pub fn and(self, clause: WhereClause) -> Self {
        self.group(BoolOp::And, clause)
    }

    pub fn or(self, clause: WhereClause) -> Self {
        self.group(BoolOp::Or, clause)
    }

    /// Whether a top-level condition uses exactly this key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, WhereItem::Condition { key: k, .. } if k == key))
    }

    /// Insert a condition ahead of every existing item.
    pub fn prepend(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.items.insert(
            0,
            WhereItem::Condition {
                key: key.into(),
                value: value.into(),
            },
        );
    }

    pub fn items(&self) -> &[WhereItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'de> Deserialize<'de> for WhereClause {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(WhereClauseVisitor)
    }
}

struct WhereClauseVisitor;

impl<'de> Visitor<'de> for WhereClauseVisitor {
    type Value = WhereClause;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a filter map, a list of filter maps, or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<WhereClause, E> {
        Ok(WhereClause::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<WhereClause, E> {
        Ok(WhereClause::new())
    }

    fn visit_map<A>(self, mut map: A) -> Result<WhereClause, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut clause = WhereClause::new();
        while let Some(key) = map.next_key::<String>()? {
            match BoolOp::from_key(&key) {
                Some(op) => {
                    let inner: WhereClause = map.next_value()?;
                    clause.items.push(WhereItem::Group { op, clause: inner });
                }
                None => {
                    let value: FilterValue = map.next_value()?;
                    clause.items.push(WhereItem::Condition { key, value });
                }
            }
        }
        Ok(clause)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<WhereClause, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut clause = WhereClause::new();
        while let Some(inner) = seq.next_element::<WhereClause>()? {
            clause.items.push(WhereItem::Group {
                op: BoolOp::And,
                clause: inner,
            });
        }
        Ok(clause)
    }
}
