//! In-process draft cache with time-to-live expiration.
//!
//! Drafts are scoped per account. Entries past their TTL are treated as
//! missing and dropped lazily on read or in bulk by `cleanup_expired()`, so a
//! long-running server does not grow without bound.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use familiar_domain::{AccountId, DraftKey};

use crate::infrastructure::ports::{CacheError, DraftCachePort};

struct DraftEntry {
    blob: String,
    stored_at: Instant,
}

pub struct InMemoryDraftCache {
    entries: DashMap<(AccountId, DraftKey), DraftEntry>,
    ttl: Duration,
}

impl InMemoryDraftCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Remove all expired entries and return how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    fn insert_at(&self, owner: &AccountId, key: DraftKey, blob: &str, stored_at: Instant) {
        self.entries.insert(
            (owner.clone(), key),
            DraftEntry {
                blob: blob.to_string(),
                stored_at,
            },
        );
    }
}

#[async_trait]
impl DraftCachePort for InMemoryDraftCache {
    async fn get(&self, owner: &AccountId, key: DraftKey) -> Result<Option<String>, CacheError> {
        let slot = (owner.clone(), key);
        let fresh = self
            .entries
            .get(&slot)
            .map(|entry| (entry.stored_at.elapsed() < self.ttl).then(|| entry.blob.clone()));

        match fresh {
            Some(Some(blob)) => Ok(Some(blob)),
            Some(None) => {
                self.entries.remove(&slot);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, owner: &AccountId, key: DraftKey, blob: String) -> Result<(), CacheError> {
        self.entries.insert(
            (owner.clone(), key),
            DraftEntry {
                blob,
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn clear(&self, owner: &AccountId, key: DraftKey) -> Result<(), CacheError> {
        self.entries.remove(&(owner.clone(), key));
        Ok(())
    }
}
