//! Constructs the compiler skipped instead of emitting.
//!
//! None of these stop compilation on their own; `CompileOptions::strict`
//! turns a non-empty list into an error.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Plain select field with no descriptor.
    DroppedSelectField { field: String },
    /// Filter key naming no declared field.
    UnknownWhereField { field: String },
    /// `NULL` compared with something other than `=` or `<>`.
    DroppedNullComparison { field: String, operator: String },
    /// `orderBy` naming no declared field.
    UnknownOrderField { field: String },
    /// Join requested for an undeclared relation.
    UnknownRelation { relation: String },
    /// Relation declared but not present in the alias table.
    UnresolvedAlias { relation: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::DroppedSelectField { field } => {
                write!(f, "select field '{}' is not declared and was dropped", field)
            }
            Diagnostic::UnknownWhereField { field } => {
                write!(f, "where field '{}' is not declared and was ignored", field)
            }
            Diagnostic::DroppedNullComparison { field, operator } => write!(
                f,
                "NULL cannot be compared with '{}' on '{}'; predicate dropped",
                operator, field
            ),
            Diagnostic::UnknownOrderField { field } => {
                write!(f, "order field '{}' is not declared; ORDER BY omitted", field)
            }
            Diagnostic::UnknownRelation { relation } => {
                write!(f, "relation '{}' is not declared; join skipped", relation)
            }
            Diagnostic::UnresolvedAlias { relation } => {
                write!(f, "no alias for relation '{}'; join skipped", relation)
            }
        }
    }
}
