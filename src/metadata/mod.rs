//! Entity metadata.
//!
//! Descriptors are loaded once, converted into closed enums, and shared
//! read-only across queries.
//!
//! ```text
//! entities.json / entities.toml
//!            │
//!            ▼  [EntityRegistry::from_file]
//! ┌───────────────────────────────────┐
//! │  EntityRegistry                   │
//! │    "Lead" -> Arc<EntityDef>       │
//! │    "Contact" -> Arc<EntityDef>    │
//! └───────────────────────────────────┘
//!            │  MetadataProvider::entity()
//!            ▼
//!      QueryCompiler
//! ```

mod provider;
mod registry;
mod types;

pub use provider::MetadataProvider;
pub use registry::EntityRegistry;
pub use types::*;

/// Errors raised while loading metadata documents.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Failed to read metadata file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML metadata: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported metadata format: {0} (expected .json or .toml)")]
    UnsupportedFormat(String),
}

pub type MetadataResult<T> = Result<T, MetadataError>;
