//! # Quarry
//!
//! Compiles declarative entity queries into dialect-specific SQL.
//!
//! ## Architecture
//!
//! A caller hands the compiler an entity type name and a [`SelectParams`]
//! bag. Entity metadata comes from a [`MetadataProvider`]; literal values are
//! quoted by a [`ValueEscaper`]. The result is one SQL statement plus the
//! diagnostics collected along the way.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        SelectParams (select, whereClause, joins, ...)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [QueryCompiler::build_select]
//! ┌─────────────────────────────────────────────────────────┐
//! │  Expression Resolver │ Join Planner │ Where Compiler     │
//! │        (entity metadata + alias table + column names)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [Dialect]
//! ┌─────────────────────────────────────────────────────────┐
//! │            SQL text (MySQL, PostgreSQL)                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use quarry::prelude::*;
//!
//! let registry = EntityRegistry::from_file("entities.json")?;
//! let compiler = QueryCompiler::new(Arc::new(registry), CompileOptions::default());
//!
//! let params = SelectParams::new()
//!     .filter(WhereClause::new().with("status", vec!["New", "Assigned"]))
//!     .limit(20);
//! let compiled = compiler.build_select("Lead", &params, false)?;
//! println!("{}", compiled.sql);
//! ```

pub mod compiler;
pub mod config;
pub mod metadata;
pub mod sql;

pub use compiler::{
    CompileError, CompileOptions, CompileResult, CompiledQuery, Diagnostic, QueryCompiler,
    SelectParams, WhereClause,
};
pub use metadata::{EntityRegistry, MetadataProvider};
pub use sql::{Dialect, Value, ValueEscaper};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compiler::{
        BoolOp, CompileError, CompileOptions, CompiledQuery, Diagnostic, FilterValue, JoinClause,
        JoinType, OrderBy, OrderTerm, QueryCompiler, SelectParams, SortDir, WhereClause,
    };
    pub use crate::metadata::{
        EntityDef, EntityRegistry, FieldDef, FieldKind, ForeignColumn, MetadataProvider,
        RelationDef, RelationKind,
    };
    pub use crate::sql::{Dialect, SqlDialect, Value, ValueEscaper};
}
