//! Account identity as delivered by the identity collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

use super::names::DisplayName;

const MAX_ACCOUNT_ID_LENGTH: usize = 128;

/// Opaque account identifier issued by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("account_id", "cannot be empty"));
        }
        if trimmed.len() > MAX_ACCOUNT_ID_LENGTH {
            return Err(DomainError::validation(
                "account_id",
                format!("cannot exceed {} bytes", MAX_ACCOUNT_ID_LENGTH),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AccountId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> String {
        id.0
    }
}

/// A verified `(account, display name, email)` triple for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    account_id: AccountId,
    display_name: DisplayName,
    email: Option<String>,
}

impl Identity {
    /// Builds an identity; a missing or invalid display name falls back to
    /// [`DisplayName::fallback`].
    pub fn new(account_id: AccountId, display_name: Option<&str>, email: Option<String>) -> Self {
        let display_name = display_name
            .and_then(|n| DisplayName::new(n).ok())
            .unwrap_or_else(DisplayName::fallback);
        let email = email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        Self {
            account_id,
            display_name,
            email,
        }
    }

    #[inline]
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    #[inline]
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    #[inline]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// True when this identity owns a resource held by `owner`.
    pub fn owns(&self, owner: &AccountId) -> bool {
        &self.account_id == owner
    }
}
