//! MetadataProvider trait definition.
//!
//! The compiler only ever reads entity descriptors, so the provider is a
//! synchronous lookup. Implementations hand out `Arc`s so one loaded
//! descriptor can be shared by every query against that entity type.

use std::sync::Arc;

use super::types::EntityDef;

/// Read-only source of entity descriptors.
///
/// # Example
///
/// ```ignore
/// use quarry::metadata::{EntityRegistry, MetadataProvider};
///
/// let registry = EntityRegistry::from_file("entities.json")?;
/// let lead = registry.entity("Lead").expect("Lead is declared");
/// assert!(lead.field("status").is_some());
/// ```
pub trait MetadataProvider: Send + Sync {
    /// Look up one entity type.
    fn entity(&self, entity_type: &str) -> Option<Arc<EntityDef>>;

    /// All known entity types, in declaration order.
    fn entity_types(&self) -> Vec<String>;
}
