//! Join key resolution with naming-convention defaults.

use crate::metadata::{RelationDef, RelationKind};

use super::naming::lcfirst;

/// Key columns (camelCase) a relation joins on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationKeys {
    /// Column on the owning side.
    pub key: String,
    /// Column on the target side.
    pub foreign_key: String,
    /// Polymorphic type column (has-children only).
    pub foreign_type: Option<String>,
    /// `(near, distant)` columns on the join table (many-to-many only).
    pub mid_keys: Option<(String, String)>,
}

impl RelationKeys {
    /// Resolve keys for `relation_name` on `entity_type`.
    ///
    /// | kind        | key               | foreign key           |
    /// |-------------|-------------------|-----------------------|
    /// | BelongsTo   | `<relation>Id`    | `id`                  |
    /// | HasMany     | `id`              | `<entity>Id`          |
    /// | HasChildren | `id`              | `parentId`            |
    /// | ManyMany    | `id`              | `id`                  |
    pub fn resolve(entity_type: &str, relation_name: &str, relation: &RelationDef) -> Self {
        let owner_key = format!("{}Id", lcfirst(entity_type));

        let (key, foreign_key) = match relation.kind {
            RelationKind::BelongsTo => (format!("{}Id", relation_name), "id".to_string()),
            RelationKind::HasMany => ("id".to_string(), owner_key.clone()),
            RelationKind::HasChildren => ("id".to_string(), "parentId".to_string()),
            RelationKind::ManyMany => ("id".to_string(), "id".to_string()),
        };

        let foreign_type = match relation.kind {
            RelationKind::HasChildren => Some(
                relation
                    .foreign_type
                    .clone()
                    .unwrap_or_else(|| "parentType".to_string()),
            ),
            _ => None,
        };

        let mid_keys = match relation.kind {
            RelationKind::ManyMany => Some(relation.mid_keys.clone().unwrap_or_else(|| {
                (owner_key, format!("{}Id", lcfirst(&relation.entity)))
            })),
            _ => None,
        };

        Self {
            key: relation.key.clone().unwrap_or(key),
            foreign_key: relation.foreign_key.clone().unwrap_or(foreign_key),
            foreign_type,
            mid_keys,
        }
    }
}
