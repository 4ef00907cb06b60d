//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the hierarchy rules.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("project {id} references missing parent {parent_id}")]
    OrphanedRecord { id: String, parent_id: String },

    #[error("scope project not found: {0}")]
    ScopeNotFound(String),
}
