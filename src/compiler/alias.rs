//! Per-entity relation alias assignment.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::metadata::{EntityDef, RelationKind};

use super::naming::{lcfirst, sanitize, to_snake_case};

/// Relation name → SQL alias for one entity type.
///
/// Built once from the relation declaration order, so the same entity always
/// yields the same map regardless of which joins a query asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    relations: IndexMap<String, String>,
    /// Join-table aliases of many-to-many relations, keyed by relation name.
    middle: IndexMap<String, String>,
}

impl AliasTable {
    pub fn build(entity: &EntityDef) -> Self {
        let mut claimed = Claims::default();
        claimed.claim(&to_snake_case(&entity.name));

        let mut table = AliasTable::default();
        for (name, relation) in &entity.relations {
            let base = sanitize(name);
            if base.is_empty() {
                continue;
            }
            let alias = claimed.claim(&base);
            tracing::trace!(entity = %entity.name, relation = %name, alias = %alias, "alias assigned");
            table.relations.insert(name.clone(), alias);

            if relation.kind == RelationKind::ManyMany {
                if let Some(mid) = relation.relation_name.as_deref() {
                    let base = lcfirst(&sanitize(mid));
                    if !base.is_empty() {
                        let alias = claimed.claim(&base);
                        table.middle.insert(name.clone(), alias);
                    }
                }
            }
        }
        table
    }

    pub fn alias(&self, relation: &str) -> Option<&str> {
        self.relations.get(relation).map(String::as_str)
    }

    pub fn middle_alias(&self, relation: &str) -> Option<&str> {
        self.middle.get(relation).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

/// Aliases already handed out, compared case-insensitively.
#[derive(Default)]
struct Claims(HashSet<String>);

impl Claims {
    fn claim(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut n = 0;
        while !self.0.insert(candidate.to_lowercase()) {
            n += 1;
            candidate = format!("{}_{}", base, n);
        }
        candidate
    }
}
