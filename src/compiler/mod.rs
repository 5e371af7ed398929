//! Query compilation from entity metadata and select parameters to SQL.
//!
//! ```text
//! entity type + SelectParams
//!        │
//!        ▼
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ select list  │   │ join planner │   │ where clause │
//! │ (expr.rs)    │   │ (joins.rs)   │   │(predicate.rs)│
//! └──────────────┘   └──────────────┘   └──────────────┘
//!        └──────────────────┼──────────────────┘
//!                           ▼
//!              select.rs → Dialect::apply_limit
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use quarry::compiler::{CompileOptions, QueryCompiler, SelectParams, WhereClause};
//! use quarry::metadata::EntityRegistry;
//!
//! let registry = EntityRegistry::from_file("entities.json")?;
//! let compiler = QueryCompiler::new(Arc::new(registry), CompileOptions::default());
//!
//! let params = SelectParams::new()
//!     .select(["id", "name"])
//!     .filter(WhereClause::new().with("status", vec!["New", "Assigned"]));
//! let compiled = compiler.build_select("Lead", &params, false)?;
//! ```

mod alias;
mod diagnostics;
mod expr;
mod filter;
mod joins;
mod keys;
mod naming;
mod params;
mod predicate;
mod select;

pub use alias::AliasTable;
pub use diagnostics::Diagnostic;
pub use expr::{FieldExpression, SqlFunction};
pub use filter::{BoolOp, FilterValue, WhereClause, WhereItem};
pub use joins::{JoinClause, JoinType};
pub use keys::RelationKeys;
pub use naming::{sanitize, to_snake_case, ColumnNames};
pub use params::{OrderBy, OrderTerm, SelectParams, SortDir};
pub use predicate::ComparisonOp;

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use crate::metadata::{EntityDef, MetadataProvider};
use crate::sql::{Dialect, ValueEscaper};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Unknown entity type: {0}")]
    UnknownEntity(String),

    #[error("Aggregation field '{field}' is not declared on {entity}")]
    UnknownAggregationField { entity: String, field: String },

    #[error("Unsupported aggregation function: {0}")]
    UnsupportedAggregation(String),

    #[error("Many-to-many relation '{relation}' on {entity} declares no join table")]
    MissingJoinTable { entity: String, relation: String },

    #[error("No selectable fields remain for {entity}")]
    EmptySelect { entity: String },

    #[error("Strict mode: {} construct(s) dropped, first: {}", .0.len(), .0.first().map(ToString::to_string).unwrap_or_default())]
    Strict(Vec<Diagnostic>),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// SQL dialect to generate.
    pub dialect: Dialect,
    /// Fail instead of dropping constructs.
    pub strict: bool,
}

impl CompileOptions {
    /// Set the SQL dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Turn diagnostics into errors.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// A compiled SQL fragment or statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    pub sql: String,
    /// Constructs that were skipped while compiling.
    pub diagnostics: Vec<Diagnostic>,
}

// ============================================================================
// Compiler
// ============================================================================

/// Compiles select queries for the entities of one metadata provider.
///
/// Alias tables and column names are cached per instance; both caches are
/// safe to share across threads.
pub struct QueryCompiler {
    metadata: Arc<dyn MetadataProvider>,
    escaper: Arc<dyn ValueEscaper>,
    options: CompileOptions,
    columns: ColumnNames,
    aliases: DashMap<String, Arc<AliasTable>>,
}

/// Per-call compilation state.
pub(crate) struct Scope {
    pub(crate) entity: Arc<EntityDef>,
    /// `to_db(entity type)`, the table name and its implicit alias.
    pub(crate) table: String,
    pub(crate) aliases: Arc<AliasTable>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Scope {
    pub(crate) fn diagnose(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(entity = %self.entity.name, %diagnostic, "construct dropped");
        self.diagnostics.push(diagnostic);
    }
}

impl QueryCompiler {
    /// Create a compiler that quotes values with the configured dialect.
    pub fn new(metadata: Arc<dyn MetadataProvider>, options: CompileOptions) -> Self {
        Self {
            metadata,
            escaper: Arc::new(options.dialect),
            options,
            columns: ColumnNames::new(),
            aliases: DashMap::new(),
        }
    }

    /// Replace the value escaper (e.g. with a driver's `quote`).
    pub fn with_escaper(mut self, escaper: Arc<dyn ValueEscaper>) -> Self {
        self.escaper = escaper;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// camelCase → snake_case, memoized.
    pub fn to_db(&self, name: &str) -> String {
        self.columns.to_db(name)
    }

    /// The alias table for `entity_type`, built on first use.
    pub fn alias_table(&self, entity_type: &str) -> CompileResult<Arc<AliasTable>> {
        let entity = self.entity(entity_type)?;
        Ok(self.aliases_for(&entity))
    }

    /// Resolve `field`, `relation.field` or `FUNC:[relation.]field` to SQL.
    pub fn resolve_expression(&self, entity_type: &str, expression: &str, distinct: bool) -> CompileResult<String> {
        let scope = self.scope(entity_type)?;
        Ok(self.resolve_in(&scope, &FieldExpression::parse(expression), distinct))
    }

    /// Compile a filter tree to a boolean expression (without `WHERE`).
    pub fn compile_where(&self, entity_type: &str, clause: &WhereClause) -> CompileResult<CompiledQuery> {
        let mut scope = self.scope(entity_type)?;
        let sql = self.compile_where_in(&mut scope, clause, BoolOp::And);
        self.finish(scope, sql)
    }

    /// Compile the join clauses `params` ask for, space separated.
    ///
    /// Uses `select`, `joins`, `leftJoins` and `joinConditions`.
    pub fn plan_joins(&self, entity_type: &str, params: &SelectParams) -> CompileResult<CompiledQuery> {
        let mut scope = self.scope(entity_type)?;
        let sql = self
            .plan_joins_in(&mut scope, params)?
            .iter()
            .map(|join| join.to_sql(self.options.dialect))
            .collect::<Vec<_>>()
            .join(" ");
        self.finish(scope, sql)
    }

    fn entity(&self, entity_type: &str) -> CompileResult<Arc<EntityDef>> {
        self.metadata
            .entity(entity_type)
            .ok_or_else(|| CompileError::UnknownEntity(entity_type.to_string()))
    }

    fn aliases_for(&self, entity: &EntityDef) -> Arc<AliasTable> {
        if let Some(table) = self.aliases.get(&entity.name) {
            return Arc::clone(&table);
        }
        let table = Arc::new(AliasTable::build(entity));
        self.aliases.insert(entity.name.clone(), Arc::clone(&table));
        table
    }

    fn scope(&self, entity_type: &str) -> CompileResult<Scope> {
        let entity = self.entity(entity_type)?;
        Ok(Scope {
            table: self.columns.to_db(&entity.name),
            aliases: self.aliases_for(&entity),
            entity,
            diagnostics: Vec::new(),
        })
    }

    fn finish(&self, scope: Scope, sql: String) -> CompileResult<CompiledQuery> {
        if self.options.strict && !scope.diagnostics.is_empty() {
            return Err(CompileError::Strict(scope.diagnostics));
        }
        tracing::debug!(
            entity = %scope.entity.name,
            dialect = %self.options.dialect,
            diagnostics = scope.diagnostics.len(),
            %sql,
            "compiled"
        );
        Ok(CompiledQuery {
            sql,
            diagnostics: scope.diagnostics,
        })
    }
}
