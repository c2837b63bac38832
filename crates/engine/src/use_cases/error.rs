//! Error taxonomy shared by every use case.
//!
//! Port and domain errors are folded into [`CoreError`] here so handlers only
//! ever see one type. Only [`CoreError::TransactionFailed`] is worth retrying.

use familiar_domain::{DomainError, Identity};

use crate::infrastructure::ports::{
    CacheError, PreconditionFailed, RepoError, RequestContext, TxError,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Sign in required")]
    Unauthorized,

    #[error("You do not own this {entity_type}")]
    PermissionDenied { entity_type: &'static str },

    #[error("{message}")]
    ValidationFailed {
        field: &'static str,
        message: String,
    },

    #[error("Creature is already listed")]
    AlreadyListed,

    #[error("Creature is not listed")]
    NotListed,

    #[error("Thread is locked")]
    ThreadLocked,

    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl CoreError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field,
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransactionFailed(_))
    }
}

/// The caller's identity, or `Unauthorized`.
pub fn require_identity(ctx: &RequestContext) -> Result<&Identity, CoreError> {
    ctx.identity().ok_or(CoreError::Unauthorized)
}

impl From<DomainError> for CoreError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation { field, message } => Self::ValidationFailed { field, message },
            DomainError::InvalidId(message) => Self::ValidationFailed { field: "id", message },
            DomainError::Parse(message) => Self::ValidationFailed {
                field: "input",
                message,
            },
            DomainError::InvalidStateTransition(message) => Self::ValidationFailed {
                field: "state",
                message,
            },
        }
    }
}

impl From<RepoError> for CoreError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            other => Self::TransactionFailed(other.to_string()),
        }
    }
}

impl From<PreconditionFailed> for CoreError {
    fn from(e: PreconditionFailed) -> Self {
        match e {
            PreconditionFailed::Missing { entity_type, id } => Self::NotFound { entity_type, id },
            PreconditionFailed::ListedFlag { actual: true, .. }
            | PreconditionFailed::DuplicateActiveListing { .. } => Self::AlreadyListed,
            PreconditionFailed::ListedFlag { actual: false, .. }
            | PreconditionFailed::NoActiveListing { .. } => Self::NotListed,
            PreconditionFailed::ThreadLocked { .. } => Self::ThreadLocked,
            PreconditionFailed::Released { .. } => {
                Self::validation("creature", "has already been released")
            }
        }
    }
}

impl From<TxError> for CoreError {
    fn from(e: TxError) -> Self {
        match e {
            TxError::Precondition(p) => p.into(),
            store @ TxError::Store { .. } => Self::TransactionFailed(store.to_string()),
        }
    }
}

impl From<CacheError> for CoreError {
    fn from(e: CacheError) -> Self {
        Self::TransactionFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use familiar_domain::{AccountId, CreatureId, ThreadId};

    #[test]
    fn only_transaction_failures_are_retryable() {
        assert!(CoreError::TransactionFailed("busy".into()).is_retryable());
        assert!(!CoreError::AlreadyListed.is_retryable());
        assert!(!CoreError::Unauthorized.is_retryable());
    }

    #[test]
    fn preconditions_map_to_taxonomy() {
        let creature_id = CreatureId::new();
        let cases: Vec<(TxError, CoreError)> = vec![
            (
                PreconditionFailed::ListedFlag {
                    creature_id,
                    actual: true,
                }
                .into(),
                CoreError::AlreadyListed,
            ),
            (
                PreconditionFailed::DuplicateActiveListing { creature_id }.into(),
                CoreError::AlreadyListed,
            ),
            (
                PreconditionFailed::ListedFlag {
                    creature_id,
                    actual: false,
                }
                .into(),
                CoreError::NotListed,
            ),
            (
                PreconditionFailed::NoActiveListing { creature_id }.into(),
                CoreError::NotListed,
            ),
            (
                PreconditionFailed::ThreadLocked {
                    thread_id: ThreadId::new(),
                }
                .into(),
                CoreError::ThreadLocked,
            ),
        ];
        for (tx, expected) in cases {
            assert_eq!(CoreError::from(tx), expected);
        }
    }

    #[test]
    fn store_failure_is_retryable_transaction_failure() {
        let err = CoreError::from(TxError::store("commit", "database is locked"));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("database is locked"));
    }

    #[test]
    fn domain_validation_keeps_field() {
        let err = CoreError::from(DomainError::validation("title", "Title cannot be empty"));
        assert_eq!(
            err,
            CoreError::ValidationFailed {
                field: "title",
                message: "Title cannot be empty".into()
            }
        );
    }

    #[test]
    fn anonymous_context_is_unauthorized() {
        assert_eq!(
            require_identity(&RequestContext::anonymous()).unwrap_err(),
            CoreError::Unauthorized
        );
        let ctx = RequestContext::authenticated(Identity::new(
            AccountId::new("user-1").unwrap(),
            None,
            None,
        ));
        assert!(require_identity(&ctx).is_ok());
    }
}
