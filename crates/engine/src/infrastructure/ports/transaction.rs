//! Atomic multi-document write primitive.
//!
//! A use case describes everything one action changes as a [`WriteBatch`] and
//! submits it once. The store applies the ops in order inside a single
//! transaction: either every op lands or none does.
//!
//! Every server timestamp written by a batch (creation, update, listing,
//! withdrawal, reply times) is the single commit time reported in the
//! [`CommitReceipt`]; timestamps carried by aggregates in the batch are ignored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use familiar_domain::{Creature, CreatureId, Listing, Post, Thread, ThreadId};

use super::error::TxError;

/// One conditional write inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Inserted unlisted and unreleased.
    InsertCreature(Creature),

    /// Replaces nickname, species, school, age, attributes, max attributes and
    /// talents. Never touches `listed` or `released`.
    ///
    /// Precondition: the creature exists and is not released.
    UpdateCreature(Creature),

    /// Compare-and-set on the `listed` flag.
    ///
    /// Precondition: the creature exists, is not released, and `listed == expected`.
    SetCreatureListed {
        creature_id: CreatureId,
        expected: bool,
        listed: bool,
    },

    /// Precondition: the creature exists, is not already released, and is not
    /// listed. A listed creature is unlisted earlier in the same batch.
    ReleaseCreature { creature_id: CreatureId },

    /// Precondition: no other active listing exists for the creature.
    InsertListing(Listing),

    /// Marks the creature's active listing withdrawn.
    ///
    /// Precondition: exactly one active listing exists.
    WithdrawActiveListing { creature_id: CreatureId },

    /// Inserted with `reply_count = 0` and `last_reply_at = created_at`.
    InsertThread(Thread),

    /// Precondition: the thread exists and is not locked.
    InsertPost(Post),

    /// `reply_count = reply_count + 1`, `last_reply_at = commit time`.
    ///
    /// Precondition: the thread exists and is not locked.
    RecordReply {
        thread_id: ThreadId,
        author_name: String,
    },
}

/// Ordered list of writes committed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an op.
    pub fn with(mut self, op: WriteOp) -> Self {
        self.ops.push(op);
        self
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Proof of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Server time assigned to every timestamp the batch wrote.
    pub committed_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionPort: Send + Sync {
    /// Applies `batch` atomically.
    async fn commit(&self, batch: WriteBatch) -> Result<CommitReceipt, TxError>;
}
