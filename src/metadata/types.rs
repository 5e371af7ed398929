//! Entity, field and relation descriptors.
//!
//! The external document keeps the ORM's loose shape (`type` strings,
//! optional keys, `notStorable` flags); everything is converted into closed
//! enums at load time so the compiler matches exhaustively.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::sql::Value;

/// One entity type: ordered fields and ordered relations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDef {
    /// Entity type name (`Lead`). Filled in by the registry from the map key.
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
    #[serde(default)]
    pub relations: IndexMap<String, RelationDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, field: FieldDef) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn with_relation(mut self, name: impl Into<String>, relation: RelationDef) -> Self {
        self.relations.insert(name.into(), relation);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.get(name)
    }
}

/// How a field is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldKind {
    /// A column on the entity's own table.
    #[default]
    Column,
    /// A column pulled through a belongs-to relation.
    Foreign {
        relation: String,
        foreign: ForeignColumn,
    },
    /// No backing column; only usable through `select`/`where` templates.
    NotStorable,
}

/// The foreign side of a `foreign` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ForeignColumn {
    Single(String),
    /// Parts joined with `CONCAT`; a literal `" "` part stays a space.
    Concat(Vec<String>),
}

/// Field descriptor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawField")]
pub struct FieldDef {
    pub kind: FieldKind,
    /// Explicit SQL expression used in the select list.
    pub select: Option<String>,
    /// Per-operator where templates with a `{value}` placeholder.
    pub where_templates: HashMap<String, String>,
    /// Order-by template with a `{direction}` placeholder.
    pub order_by: Option<String>,
}

impl FieldDef {
    pub fn column() -> Self {
        Self::default()
    }

    pub fn foreign(relation: impl Into<String>, foreign: ForeignColumn) -> Self {
        Self {
            kind: FieldKind::Foreign {
                relation: relation.into(),
                foreign,
            },
            ..Default::default()
        }
    }

    pub fn not_storable() -> Self {
        Self {
            kind: FieldKind::NotStorable,
            ..Default::default()
        }
    }

    pub fn with_select(mut self, template: impl Into<String>) -> Self {
        self.select = Some(template.into());
        self
    }

    pub fn with_where(mut self, operator: impl Into<String>, template: impl Into<String>) -> Self {
        self.where_templates.insert(operator.into(), template.into());
        self
    }

    pub fn with_order_by(mut self, template: impl Into<String>) -> Self {
        self.order_by = Some(template.into());
        self
    }

    pub fn is_storable(&self) -> bool {
        self.kind != FieldKind::NotStorable
    }

    /// Relation a foreign field reads through.
    pub fn foreign_relation(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Foreign { relation, .. } => Some(relation),
            _ => None,
        }
    }

    pub fn where_template(&self, operator: &str) -> Option<&str> {
        self.where_templates
            .get(operator)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }
}

/// Field as written in a metadata document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    not_storable: bool,
    /// Anything other than `db` has no column.
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    relation: Option<String>,
    #[serde(default)]
    foreign: Option<ForeignColumn>,
    #[serde(default)]
    select: Option<String>,
    #[serde(rename = "where", default)]
    where_templates: HashMap<String, String>,
    #[serde(default)]
    order_by: Option<String>,
}

impl TryFrom<RawField> for FieldDef {
    type Error = String;

    fn try_from(raw: RawField) -> Result<Self, Self::Error> {
        let off_db = raw.source.as_deref().is_some_and(|s| s != "db");

        let kind = if raw.not_storable || off_db {
            FieldKind::NotStorable
        } else if raw.kind.as_deref() == Some("foreign") {
            match (raw.relation, raw.foreign) {
                (Some(relation), Some(foreign)) => FieldKind::Foreign { relation, foreign },
                (None, _) => return Err("foreign field requires `relation`".into()),
                (_, None) => return Err("foreign field requires `foreign`".into()),
            }
        } else {
            FieldKind::Column
        };

        Ok(FieldDef {
            kind,
            select: raw.select.filter(|s| !s.is_empty()),
            where_templates: raw.where_templates,
            order_by: raw.order_by.filter(|s| !s.is_empty()),
        })
    }
}

/// Relation kinds the compiler knows how to join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    BelongsTo,
    HasMany,
    HasChildren,
    ManyMany,
}

/// Relation descriptor. Unset keys fall back to naming conventions
/// (see `compiler::keys`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationDef {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    /// Target entity type.
    pub entity: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub foreign_key: Option<String>,
    #[serde(default)]
    pub foreign_type: Option<String>,
    /// Join entity for many-to-many (`EntityTeam`).
    #[serde(default)]
    pub relation_name: Option<String>,
    /// `[near, distant]` columns on the join table.
    #[serde(default)]
    pub mid_keys: Option<(String, String)>,
    /// Static equality conditions on the join table.
    #[serde(default)]
    pub conditions: IndexMap<String, Value>,
    /// Never joined automatically.
    #[serde(default)]
    pub no_join: bool,
}

impl RelationDef {
    pub fn new(kind: RelationKind, entity: impl Into<String>) -> Self {
        Self {
            kind,
            entity: entity.into(),
            key: None,
            foreign_key: None,
            foreign_type: None,
            relation_name: None,
            mid_keys: None,
            conditions: IndexMap::new(),
            no_join: false,
        }
    }

    pub fn belongs_to(entity: impl Into<String>) -> Self {
        Self::new(RelationKind::BelongsTo, entity)
    }

    pub fn has_many(entity: impl Into<String>) -> Self {
        Self::new(RelationKind::HasMany, entity)
    }

    pub fn has_children(entity: impl Into<String>) -> Self {
        Self::new(RelationKind::HasChildren, entity)
    }

    pub fn many_many(entity: impl Into<String>, relation_name: impl Into<String>) -> Self {
        Self {
            relation_name: Some(relation_name.into()),
            ..Self::new(RelationKind::ManyMany, entity)
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = Some(foreign_key.into());
        self
    }

    pub fn with_mid_keys(mut self, near: impl Into<String>, distant: impl Into<String>) -> Self {
        self.mid_keys = Some((near.into(), distant.into()));
        self
    }

    pub fn with_condition(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(column.into(), value.into());
        self
    }

    pub fn no_join(mut self) -> Self {
        self.no_join = true;
        self
    }
}
