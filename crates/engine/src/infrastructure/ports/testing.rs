//! Testability and client-storage ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use familiar_domain::{AccountId, DraftKey};

use super::error::CacheError;

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// =============================================================================
// Draft Cache
// =============================================================================

/// Narrow get/set/clear contract over the unsaved-draft store.
///
/// Values are opaque JSON blobs; entries are scoped to the owning account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DraftCachePort: Send + Sync {
    async fn get(&self, owner: &AccountId, key: DraftKey) -> Result<Option<String>, CacheError>;
    async fn set(&self, owner: &AccountId, key: DraftKey, blob: String) -> Result<(), CacheError>;
    async fn clear(&self, owner: &AccountId, key: DraftKey) -> Result<(), CacheError>;
}
