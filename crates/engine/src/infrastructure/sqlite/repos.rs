//! Read-side repository implementations.

use async_trait::async_trait;
use familiar_domain::{AccountId, Creature, CreatureId, ForumCategory, Listing, Post, Thread, ThreadId};

use super::rows::{creature_from_row, listing_from_row, post_from_row, thread_from_row};
use super::SqliteStore;
use crate::infrastructure::ports::{CreatureRepo, ListingRepo, RepoError, ThreadRepo};

#[async_trait]
impl CreatureRepo for SqliteStore {
    async fn get(&self, id: CreatureId) -> Result<Option<Creature>, RepoError> {
        let row = sqlx::query("SELECT * FROM creatures WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_creature", e))?;

        row.as_ref().map(creature_from_row).transpose()
    }

    async fn list_by_owner(&self, owner: &AccountId) -> Result<Vec<Creature>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM creatures
            WHERE owner_id = ? AND released = 0
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_creatures", e))?;

        rows.iter().map(creature_from_row).collect()
    }
}

#[async_trait]
impl ListingRepo for SqliteStore {
    async fn list_active(&self, limit: u32) -> Result<Vec<Listing>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM listings
            WHERE status = 'active'
            ORDER BY listed_at DESC, id
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_active_listings", e))?;

        rows.iter().map(listing_from_row).collect()
    }
}

#[async_trait]
impl ThreadRepo for SqliteStore {
    async fn get(&self, id: ThreadId) -> Result<Option<Thread>, RepoError> {
        let row = sqlx::query("SELECT * FROM threads WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_thread", e))?;

        row.as_ref().map(thread_from_row).transpose()
    }

    async fn list(
        &self,
        category: Option<ForumCategory>,
        limit: u32,
    ) -> Result<Vec<Thread>, RepoError> {
        let rows = match category {
            Some(category) => {
                sqlx::query(
                    r#"
                    SELECT * FROM threads
                    WHERE category = ?
                    ORDER BY is_pinned DESC, last_reply_at DESC, id
                    LIMIT ?
                    "#,
                )
                .bind(category.slug())
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT * FROM threads
                    ORDER BY is_pinned DESC, last_reply_at DESC, id
                    LIMIT ?
                    "#,
                )
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| RepoError::database("list_threads", e))?;

        rows.iter().map(thread_from_row).collect()
    }

    async fn list_posts(&self, thread_id: ThreadId) -> Result<Vec<Post>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM posts
            WHERE thread_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(thread_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_posts", e))?;

        rows.iter().map(post_from_row).collect()
    }
}
