//! Thread and Post aggregates - the discussion board
//!
//! # Invariants
//!
//! - `reply_count` equals the number of posts in the thread
//! - `last_reply_at` is the newest post's creation time, or the thread's own
//!   creation time while it has no posts
//!
//! Both are maintained by the store in the same commit that inserts a post.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregates::creature::Creature;
use crate::error::DomainError;
use crate::ids::{CreatureId, PostId, ThreadId};
use crate::value_objects::{
    AccountId, DisplayName, ForumCategory, Identity, PostBody, Tags, ThreadTitle,
};

/// Who wrote a thread or post, with an optional persona override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    account_id: AccountId,
    account_name: DisplayName,
    persona: Option<DisplayName>,
}

impl Author {
    pub fn new(identity: &Identity, persona: Option<DisplayName>) -> Self {
        Self {
            account_id: identity.account_id().clone(),
            account_name: identity.display_name().clone(),
            persona,
        }
    }

    pub fn restore(account_id: AccountId, account_name: DisplayName, persona: Option<DisplayName>) -> Self {
        Self {
            account_id,
            account_name,
            persona,
        }
    }

    #[inline]
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    #[inline]
    pub fn account_name(&self) -> &DisplayName {
        &self.account_name
    }

    #[inline]
    pub fn persona(&self) -> Option<&DisplayName> {
        self.persona.as_ref()
    }

    /// Name shown on the board: the persona when set, else the account name.
    pub fn display_name(&self) -> &DisplayName {
        self.persona.as_ref().unwrap_or(&self.account_name)
    }
}

/// Creature attached to a thread, frozen at posting time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedAsset {
    pub creature_id: CreatureId,
    pub nickname: Option<String>,
    pub species: String,
    pub school: String,
}

impl AttachedAsset {
    pub fn of(creature: &Creature) -> Self {
        let profile = creature.profile();
        Self {
            creature_id: creature.id(),
            nickname: profile.nickname().map(|n| n.as_str().to_string()),
            species: profile.species().as_str().to_string(),
            school: profile.school().as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    id: ThreadId,
    author: Author,
    title: ThreadTitle,
    body: PostBody,
    category: ForumCategory,
    tags: Tags,
    attached_asset: Option<AttachedAsset>,
    reply_count: u32,
    last_reply_at: DateTime<Utc>,
    last_reply_author_name: Option<String>,
    is_pinned: bool,
    is_locked: bool,
    created_at: DateTime<Utc>,
}

impl Thread {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Opens a thread with no replies.
    pub fn new(
        author: Author,
        title: ThreadTitle,
        body: PostBody,
        category: ForumCategory,
        tags: Tags,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ThreadId::new(),
            author,
            title,
            body,
            category,
            tags,
            attached_asset: None,
            reply_count: 0,
            last_reply_at: now,
            last_reply_author_name: None,
            is_pinned: false,
            is_locked: false,
            created_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> ThreadId {
        self.id
    }

    #[inline]
    pub fn author(&self) -> &Author {
        &self.author
    }

    #[inline]
    pub fn title(&self) -> &ThreadTitle {
        &self.title
    }

    #[inline]
    pub fn body(&self) -> &PostBody {
        &self.body
    }

    #[inline]
    pub fn category(&self) -> ForumCategory {
        self.category
    }

    #[inline]
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    #[inline]
    pub fn attached_asset(&self) -> Option<&AttachedAsset> {
        self.attached_asset.as_ref()
    }

    #[inline]
    pub fn reply_count(&self) -> u32 {
        self.reply_count
    }

    #[inline]
    pub fn last_reply_at(&self) -> DateTime<Utc> {
        self.last_reply_at
    }

    #[inline]
    pub fn last_reply_author_name(&self) -> Option<&str> {
        self.last_reply_author_name.as_deref()
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // =========================================================================
    // Replies
    // =========================================================================

    /// Fails if the thread no longer accepts replies.
    pub fn ensure_open(&self) -> Result<(), DomainError> {
        if self.is_locked {
            return Err(DomainError::invalid_state_transition("thread is locked"));
        }
        Ok(())
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_attached_asset(mut self, asset: AttachedAsset) -> Self {
        self.attached_asset = Some(asset);
        self
    }

    pub fn with_id(mut self, id: ThreadId) -> Self {
        self.id = id;
        self
    }

    pub fn with_flags(mut self, is_pinned: bool, is_locked: bool) -> Self {
        self.is_pinned = is_pinned;
        self.is_locked = is_locked;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Restores the reply counters read from storage.
    pub fn with_reply_state(
        mut self,
        reply_count: u32,
        last_reply_at: DateTime<Utc>,
        last_reply_author_name: Option<String>,
    ) -> Self {
        self.reply_count = reply_count;
        self.last_reply_at = last_reply_at;
        self.last_reply_author_name = last_reply_author_name;
        self
    }
}

/// A reply in a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    id: PostId,
    thread_id: ThreadId,
    author: Author,
    body: PostBody,
    created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(thread_id: ThreadId, author: Author, body: PostBody, now: DateTime<Utc>) -> Self {
        Self {
            id: PostId::new(),
            thread_id,
            author,
            body,
            created_at: now,
        }
    }

    #[inline]
    pub fn id(&self) -> PostId {
        self.id
    }

    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    #[inline]
    pub fn author(&self) -> &Author {
        &self.author
    }

    #[inline]
    pub fn body(&self) -> &PostBody {
        &self.body
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn with_id(mut self, id: PostId) -> Self {
        self.id = id;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn identity(name: &str) -> Identity {
        Identity::new(AccountId::new(name).unwrap(), Some(name), None)
    }

    fn thread(now: DateTime<Utc>) -> Thread {
        Thread::new(
            Author::new(&identity("op"), None),
            ThreadTitle::new("Best pet for PVP?").unwrap(),
            PostBody::new("Looking for advice").unwrap(),
            ForumCategory::Pvp,
            Tags::new(["pvp", "help"]).unwrap(),
            now,
        )
    }

    #[test]
    fn new_thread_starts_with_no_replies() {
        let now = Utc::now();
        let t = thread(now);
        assert_eq!(t.reply_count(), 0);
        assert_eq!(t.last_reply_at(), now);
        assert_eq!(t.created_at(), now);
        assert!(t.last_reply_author_name().is_none());
    }

    #[test]
    fn persona_overrides_account_name() {
        let author = Author::new(&identity("acct"), Some(DisplayName::new("Fireblade").unwrap()));
        assert_eq!(author.display_name().as_str(), "Fireblade");
        assert_eq!(author.account_name().as_str(), "acct");
    }

    #[test]
    fn restored_reply_state_is_kept() {
        let now = Utc::now();
        let later = now + Duration::seconds(5);
        let t = thread(now).with_reply_state(3, later, Some("replier".to_string()));
        assert_eq!(t.reply_count(), 3);
        assert_eq!(t.last_reply_at(), later);
        assert_eq!(t.last_reply_author_name(), Some("replier"));
        assert_eq!(t.created_at(), now);
    }

    #[test]
    fn locked_thread_is_not_open() {
        let now = Utc::now();
        assert!(thread(now).ensure_open().is_ok());
        assert!(thread(now).with_flags(false, true).ensure_open().is_err());
    }
}
