//! In-memory entity registry loaded from JSON or TOML.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use super::provider::MetadataProvider;
use super::types::EntityDef;
use super::{MetadataError, MetadataResult};

/// Entity descriptors keyed by entity type, in declaration order.
///
/// The document is a map of entity type to `{ fields, relations }`:
///
/// ```json
/// {
///   "Lead": {
///     "fields": { "id": {}, "status": {} },
///     "relations": { "assignedUser": { "type": "belongsTo", "entity": "User" } }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: IndexMap<String, Arc<EntityDef>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity, replacing any earlier definition of the same type.
    /// Entities without a name are ignored.
    pub fn insert(&mut self, entity: EntityDef) {
        if entity.name.is_empty() {
            return;
        }
        self.entities.insert(entity.name.clone(), Arc::new(entity));
    }

    pub fn with(mut self, entity: EntityDef) -> Self {
        self.insert(entity);
        self
    }

    pub fn from_json_str(content: &str) -> MetadataResult<Self> {
        let raw: IndexMap<String, EntityDef> = serde_json::from_str(content)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_toml_str(content: &str) -> MetadataResult<Self> {
        let raw: IndexMap<String, EntityDef> = toml::from_str(content)?;
        Ok(Self::from_raw(raw))
    }

    /// Load from a `.json` or `.toml` file.
    pub fn from_file(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let registry = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            Some("toml") => Self::from_toml_str(&content)?,
            _ => return Err(MetadataError::UnsupportedFormat(path.display().to_string())),
        };

        tracing::debug!(
            path = %path.display(),
            entities = registry.len(),
            "loaded entity metadata"
        );
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn from_raw(raw: IndexMap<String, EntityDef>) -> Self {
        let entities = raw
            .into_iter()
            .map(|(name, mut entity)| {
                entity.name = name.clone();
                (name, Arc::new(entity))
            })
            .collect();
        Self { entities }
    }
}

impl MetadataProvider for EntityRegistry {
    fn entity(&self, entity_type: &str) -> Option<Arc<EntityDef>> {
        self.entities.get(entity_type).cloned()
    }

    fn entity_types(&self) -> Vec<String> {
        self.entities.keys().cloned().collect()
    }
}
