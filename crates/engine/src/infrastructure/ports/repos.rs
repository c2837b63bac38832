//! Repository port traits for point reads and queries.
//!
//! Writes never go through these traits; they are grouped into a
//! [`WriteBatch`](super::WriteBatch) and committed through
//! [`TransactionPort`](super::TransactionPort).

use async_trait::async_trait;
use familiar_domain::{
    AccountId, Creature, CreatureId, ForumCategory, Listing, Post, Thread, ThreadId,
};

use super::error::RepoError;

// =============================================================================
// Database Ports (one per aggregate)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CreatureRepo: Send + Sync {
    async fn get(&self, id: CreatureId) -> Result<Option<Creature>, RepoError>;

    /// Unreleased creatures of `owner`, newest first.
    async fn list_by_owner(&self, owner: &AccountId) -> Result<Vec<Creature>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepo: Send + Sync {
    /// Active listings, newest first.
    async fn list_active(&self, limit: u32) -> Result<Vec<Listing>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThreadRepo: Send + Sync {
    async fn get(&self, id: ThreadId) -> Result<Option<Thread>, RepoError>;

    /// Pinned threads first, then by most recent reply.
    async fn list(
        &self,
        category: Option<ForumCategory>,
        limit: u32,
    ) -> Result<Vec<Thread>, RepoError>;

    /// Posts of a thread in creation order.
    async fn list_posts(&self, thread_id: ThreadId) -> Result<Vec<Post>, RepoError>;
}
