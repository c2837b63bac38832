//! Caller identity extraction.
//!
//! An upstream verifier authenticates the user and forwards the result as
//! `X-User-Id`, `X-User-Name` and `X-User-Email`. Missing or unusable headers
//! yield an anonymous context; use cases that need a caller answer
//! `Unauthorized` themselves, so public routes share the same extractor.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use familiar_domain::{AccountId, Identity};

use crate::infrastructure::ports::RequestContext;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Extractor for the per-request [`RequestContext`].
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn context_from(headers: &HeaderMap) -> RequestContext {
    let Some(account_id) = header(headers, USER_ID_HEADER).and_then(|id| AccountId::new(id).ok())
    else {
        return RequestContext::anonymous();
    };

    RequestContext::authenticated(Identity::new(
        account_id,
        header(headers, USER_NAME_HEADER),
        header(headers, USER_EMAIL_HEADER).map(str::to_string),
    ))
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(context_from(&parts.headers)))
    }
}
