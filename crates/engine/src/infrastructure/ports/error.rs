//! Error types for port operations.

use familiar_domain::{CreatureId, ThreadId};

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Database operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// A stored row no longer decodes into a valid domain value.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }
}

/// A conditional write whose condition did not hold at commit time.
///
/// The whole batch is rolled back when any precondition fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionFailed {
    #[error("{entity_type} not found: {id}")]
    Missing {
        entity_type: &'static str,
        id: String,
    },

    /// The creature's `listed` flag was not the expected value.
    #[error("creature {creature_id} has listed = {actual}")]
    ListedFlag { creature_id: CreatureId, actual: bool },

    #[error("creature {creature_id} has no active listing")]
    NoActiveListing { creature_id: CreatureId },

    #[error("creature {creature_id} already has an active listing")]
    DuplicateActiveListing { creature_id: CreatureId },

    #[error("thread {thread_id} is locked")]
    ThreadLocked { thread_id: ThreadId },

    #[error("creature {creature_id} has been released")]
    Released { creature_id: CreatureId },
}

/// Failure of an atomic commit. Nothing from the batch was persisted.
#[derive(Debug, thiserror::Error)]
pub enum TxError {
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionFailed),

    /// The store itself failed (busy, I/O, constraint outside the preconditions).
    #[error("Store error in {operation}: {message}")]
    Store {
        operation: &'static str,
        message: String,
    },
}

impl TxError {
    pub fn store(operation: &'static str, message: impl ToString) -> Self {
        Self::Store {
            operation,
            message: message.to_string(),
        }
    }
}

/// Draft cache failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    #[error("Draft cache unavailable: {0}")]
    Unavailable(String),
}
