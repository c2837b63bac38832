//! Maps use case failures onto the action envelope.
//!
//! Every failure leaves the HTTP layer as
//! `{ "success": false, "error": { code, message, field?, retryable } }` with a
//! matching status code. Store details are logged, never sent.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use familiar_shared::{ActionError, ActionResponse, ErrorCode};

use crate::use_cases::CoreError;

pub const RETRY_MESSAGE: &str = "Could not save right now - please try again";

#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    /// Malformed body, path or query.
    BadRequest(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Core(e) => match e {
                CoreError::Unauthorized => StatusCode::UNAUTHORIZED,
                CoreError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
                CoreError::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                CoreError::AlreadyListed | CoreError::NotListed | CoreError::ThreadLocked => {
                    StatusCode::CONFLICT
                }
                CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                CoreError::TransactionFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    fn to_action_error(&self) -> ActionError {
        match self {
            Self::BadRequest(message) => ActionError::new(ErrorCode::BadRequest, message.clone()),
            Self::Core(e) => match e {
                CoreError::Unauthorized => ActionError::new(ErrorCode::Unauthorized, e.to_string()),
                CoreError::PermissionDenied { .. } => {
                    ActionError::new(ErrorCode::PermissionDenied, e.to_string())
                }
                CoreError::ValidationFailed { field, message } => {
                    ActionError::new(ErrorCode::ValidationFailed, format!("{field}: {message}"))
                        .with_field(*field)
                }
                CoreError::AlreadyListed => ActionError::new(ErrorCode::AlreadyListed, e.to_string()),
                CoreError::NotListed => ActionError::new(ErrorCode::NotListed, e.to_string()),
                CoreError::ThreadLocked => ActionError::new(ErrorCode::ThreadLocked, e.to_string()),
                CoreError::NotFound { .. } => ActionError::new(ErrorCode::NotFound, e.to_string()),
                CoreError::TransactionFailed(detail) => {
                    tracing::error!(error = %detail, "Store failure surfaced to client");
                    ActionError::new(ErrorCode::TransactionFailed, RETRY_MESSAGE)
                }
            },
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        Self::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: ActionResponse<()> = ActionResponse::failed(self.to_action_error());
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn validation_failure_names_the_field() {
        let (status, body) = render(CoreError::validation("title", "cannot be empty").into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": {
                    "code": "validation_failed",
                    "message": "title: cannot be empty",
                    "field": "title",
                    "retryable": false
                }
            })
        );
    }

    #[tokio::test]
    async fn store_failure_is_retryable_and_hides_detail() {
        let (status, body) =
            render(CoreError::TransactionFailed("disk I/O error at /var/db".into()).into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["retryable"], json!(true));
        assert_eq!(body["error"]["message"], json!(RETRY_MESSAGE));
    }

    #[tokio::test]
    async fn statuses_follow_the_taxonomy() {
        let cases = [
            (CoreError::Unauthorized, StatusCode::UNAUTHORIZED, "unauthorized"),
            (
                CoreError::PermissionDenied {
                    entity_type: "Creature",
                },
                StatusCode::FORBIDDEN,
                "permission_denied",
            ),
            (CoreError::AlreadyListed, StatusCode::CONFLICT, "already_listed"),
            (CoreError::NotListed, StatusCode::CONFLICT, "not_listed"),
            (CoreError::ThreadLocked, StatusCode::CONFLICT, "thread_locked"),
            (
                CoreError::not_found("Thread", "abc"),
                StatusCode::NOT_FOUND,
                "not_found",
            ),
        ];
        for (err, expected_status, expected_code) in cases {
            let (status, body) = render(err.into()).await;
            assert_eq!(status, expected_status);
            assert_eq!(body["error"]["code"], json!(expected_code));
            assert_eq!(body["success"], json!(false));
        }
    }
}
