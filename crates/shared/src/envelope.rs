//! Action envelope
//!
//! Every action answers with `{ "success": true, ...data }` or
//! `{ "success": false, "error": { code, message, field?, retryable } }`, so a
//! client can render failures inline instead of crashing.

use serde::{Deserialize, Serialize};

// =============================================================================
// Error Codes
// =============================================================================

/// Error classification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// No identity, or an identity that could not be verified
    Unauthorized,
    /// Identity is valid but does not own the resource
    PermissionDenied,
    /// A field failed a length or shape check
    ValidationFailed,
    AlreadyListed,
    NotListed,
    ThreadLocked,
    NotFound,
    /// The store could not commit; the caller may retry
    TransactionFailed,
    /// Body or path could not be decoded
    BadRequest,
    InternalError,
    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

impl ErrorCode {
    /// Only store commit failures are worth retrying as-is.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::TransactionFailed)
    }
}

// =============================================================================
// Envelope
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub retryable: bool,
}

impl ActionError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Result of an action. Success payload fields are inlined next to `success`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
}

impl<T> ActionResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: ActionError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}
