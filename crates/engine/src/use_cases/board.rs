//! Discussion board use cases.

use std::str::FromStr;
use std::sync::Arc;

use familiar_domain::{
    AttachedAsset, Author, CreatureId, DisplayName, ForumCategory, Identity, Post, PostBody,
    PostId, Tags, Thread, ThreadId, ThreadTitle,
};
use tracing::{debug, info, warn};

use crate::infrastructure::ports::{
    ClockPort, CreatureRepo, RequestContext, ThreadRepo, TransactionPort, WriteBatch, WriteOp,
};

use super::creatures::load_owned;
use super::error::{require_identity, CoreError};

pub const DEFAULT_THREAD_LIMIT: u32 = 20;
pub const MAX_THREAD_LIMIT: u32 = 50;

/// Container for board use cases.
pub struct BoardUseCases {
    pub create_thread: Arc<CreateThread>,
    pub post_reply: Arc<PostReply>,
    pub list_threads: Arc<ListThreads>,
    pub get_thread: Arc<GetThread>,
}

impl BoardUseCases {
    pub fn new(
        create_thread: Arc<CreateThread>,
        post_reply: Arc<PostReply>,
        list_threads: Arc<ListThreads>,
        get_thread: Arc<GetThread>,
    ) -> Self {
        Self {
            create_thread,
            post_reply,
            list_threads,
            get_thread,
        }
    }
}

/// Builds the author, applying a non-blank persona name as the shown name.
fn author_for(identity: &Identity, persona_name: Option<&str>) -> Result<Author, CoreError> {
    let persona = persona_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(DisplayName::new)
        .transpose()?;
    Ok(Author::new(identity, persona))
}

// =============================================================================
// Create thread
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateThreadInput {
    pub title: String,
    pub body: String,
    /// Label or slug.
    pub category: String,
    pub tags: Vec<String>,
    pub persona_name: Option<String>,
    pub attached_creature_id: Option<CreatureId>,
}

/// `createThread`
pub struct CreateThread {
    creatures: Arc<dyn CreatureRepo>,
    tx: Arc<dyn TransactionPort>,
    clock: Arc<dyn ClockPort>,
}

impl CreateThread {
    pub fn new(
        creatures: Arc<dyn CreatureRepo>,
        tx: Arc<dyn TransactionPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            creatures,
            tx,
            clock,
        }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        input: CreateThreadInput,
    ) -> Result<ThreadId, CoreError> {
        let identity = require_identity(ctx)?;

        let title = ThreadTitle::new(&input.title)?;
        let body = PostBody::new(&input.body)?;
        let category = ForumCategory::from_str(&input.category)?;
        let tags = Tags::new(&input.tags)?;
        let author = author_for(identity, input.persona_name.as_deref())?;

        let asset = match input.attached_creature_id {
            Some(creature_id) => {
                let creature =
                    load_owned(self.creatures.as_ref(), identity, creature_id).await?;
                creature.ensure_active()?;
                Some(AttachedAsset::of(&creature))
            }
            None => None,
        };

        let mut thread = Thread::new(author, title, body, category, tags, self.clock.now());
        if let Some(asset) = asset {
            thread = thread.with_attached_asset(asset);
        }
        let thread_id = thread.id();

        self.tx
            .commit(WriteBatch::new().with(WriteOp::InsertThread(thread)))
            .await
            .map_err(|e| {
                warn!(thread_id = %thread_id, error = %e, "Thread creation failed");
                CoreError::from(e)
            })?;

        info!(
            thread_id = %thread_id,
            category = category.slug(),
            author = %identity.account_id(),
            "Thread created"
        );
        Ok(thread_id)
    }
}

// =============================================================================
// Reply
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReplyInput {
    pub body: String,
    pub persona_name: Option<String>,
}

/// `postReply`: the post and the thread's counters change in one commit.
pub struct PostReply {
    threads: Arc<dyn ThreadRepo>,
    tx: Arc<dyn TransactionPort>,
    clock: Arc<dyn ClockPort>,
}

impl PostReply {
    pub fn new(
        threads: Arc<dyn ThreadRepo>,
        tx: Arc<dyn TransactionPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self { threads, tx, clock }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        thread_id: ThreadId,
        input: PostReplyInput,
    ) -> Result<PostId, CoreError> {
        let identity = require_identity(ctx)?;
        let body = PostBody::new(&input.body)?;
        let author = author_for(identity, input.persona_name.as_deref())?;

        let thread = self
            .threads
            .get(thread_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Thread", thread_id))?;
        if thread.ensure_open().is_err() {
            return Err(CoreError::ThreadLocked);
        }

        let author_name = author.display_name().as_str().to_string();
        let post = Post::new(thread_id, author, body, self.clock.now());
        let post_id = post.id();

        let batch = WriteBatch::new()
            .with(WriteOp::InsertPost(post))
            .with(WriteOp::RecordReply {
                thread_id,
                author_name,
            });

        let receipt = self.tx.commit(batch).await.map_err(|e| {
            warn!(thread_id = %thread_id, error = %e, "Reply rejected");
            CoreError::from(e)
        })?;

        info!(
            thread_id = %thread_id,
            post_id = %post_id,
            committed_at = %receipt.committed_at,
            "Reply posted"
        );
        Ok(post_id)
    }
}

// =============================================================================
// Reads
// =============================================================================

/// `listThreads`: pinned first, then most recent activity.
pub struct ListThreads {
    threads: Arc<dyn ThreadRepo>,
}

impl ListThreads {
    pub fn new(threads: Arc<dyn ThreadRepo>) -> Self {
        Self { threads }
    }

    pub async fn execute(
        &self,
        category: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<Thread>, CoreError> {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(ForumCategory::from_str)
            .transpose()?;
        let limit = limit.unwrap_or(DEFAULT_THREAD_LIMIT).clamp(1, MAX_THREAD_LIMIT);

        let threads = self.threads.list(category, limit).await?;
        debug!(?category, limit, count = threads.len(), "Listed threads");
        Ok(threads)
    }
}

/// `getThread`: a thread with its replies in posting order.
pub struct GetThread {
    threads: Arc<dyn ThreadRepo>,
}

impl GetThread {
    pub fn new(threads: Arc<dyn ThreadRepo>) -> Self {
        Self { threads }
    }

    pub async fn execute(&self, thread_id: ThreadId) -> Result<(Thread, Vec<Post>), CoreError> {
        let thread = self
            .threads
            .get(thread_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Thread", thread_id))?;
        let posts = self.threads.list_posts(thread_id).await?;
        debug!(thread_id = %thread_id, posts = posts.len(), "Loaded thread");
        Ok((thread, posts))
    }
}
