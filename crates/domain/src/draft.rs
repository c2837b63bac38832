//! Draft reconciliation
//!
//! An unsaved attribute draft may live in a client-local cache. On load the
//! draft is merged with the authoritative record; afterwards a [`DraftEditor`]
//! tracks whether the working copy differs from the last saved baseline.
//!
//! ```text
//!   Clean --edit--> Dirty --discard--------> Clean
//!                     |  --commit ok-------> Clean (baseline := effective)
//!                     |  --commit failed---> Dirty (edits kept)
//! ```
//!
//! Dirtiness is always recomputed as `effective != baseline`, so editing a
//! value back to its saved number returns the editor to Clean.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::CreatureId;
use crate::potentials::{compute_potentials, Potentials};
use crate::value_objects::{Attribute, AttributeSet};

/// Cache slot a draft is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DraftKey {
    /// The calculator page's not-yet-saved creature.
    New,
    Creature(CreatureId),
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("draft:new"),
            Self::Creature(id) => write!(f, "draft:creature:{id}"),
        }
    }
}

/// Unsaved working copy as stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub key: DraftKey,
    pub attributes: AttributeSet,
}

impl Draft {
    pub fn new(key: DraftKey, attributes: AttributeSet) -> Self {
        Self { key, attributes }
    }
}

/// Result of merging a cached draft with the authoritative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    pub effective: AttributeSet,
    pub is_dirty: bool,
}

/// Picks the working values for `key`.
///
/// A cached draft only applies when it was saved under the same key; a draft
/// for a different creature is ignored.
pub fn reconcile(key: DraftKey, authoritative: &AttributeSet, cached: Option<&Draft>) -> Reconciled {
    let effective = cached
        .filter(|draft| draft.key == key)
        .map(|draft| draft.attributes)
        .unwrap_or(*authoritative);
    Reconciled {
        effective,
        is_dirty: effective != *authoritative,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Clean,
    Dirty,
}

/// Working-copy state machine for one creature's attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftEditor {
    key: DraftKey,
    baseline: AttributeSet,
    effective: AttributeSet,
}

impl DraftEditor {
    /// Opens an editor over `authoritative`, resuming `cached` when it matches `key`.
    pub fn open(key: DraftKey, authoritative: AttributeSet, cached: Option<&Draft>) -> Self {
        let reconciled = reconcile(key, &authoritative, cached);
        Self {
            key,
            baseline: authoritative,
            effective: reconciled.effective,
        }
    }

    #[inline]
    pub fn key(&self) -> DraftKey {
        self.key
    }

    #[inline]
    pub fn baseline(&self) -> &AttributeSet {
        &self.baseline
    }

    #[inline]
    pub fn effective(&self) -> &AttributeSet {
        &self.effective
    }

    pub fn status(&self) -> DraftStatus {
        if self.is_dirty() {
            DraftStatus::Dirty
        } else {
            DraftStatus::Clean
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.effective != self.baseline
    }

    /// Live potentials of the working copy.
    pub fn potentials(&self) -> Potentials {
        compute_potentials(&self.effective)
    }

    /// Sets one attribute. Out-of-range values are kept; they are rejected at save.
    pub fn edit(&mut self, attribute: Attribute, value: i32) -> DraftStatus {
        self.effective.set(attribute, value);
        self.status()
    }

    /// Replaces the whole working copy.
    pub fn replace(&mut self, attributes: AttributeSet) -> DraftStatus {
        self.effective = attributes;
        self.status()
    }

    /// Drops unsaved edits.
    pub fn discard(&mut self) {
        self.effective = self.baseline;
    }

    /// Adopts `saved` as the new baseline after a successful write.
    ///
    /// A save of a new creature moves the editor to that creature's key.
    pub fn commit_succeeded(&mut self, key: DraftKey, saved: AttributeSet) {
        self.key = key;
        self.baseline = saved;
        self.effective = saved;
    }

    /// A failed write changes nothing; edits stay pending.
    pub fn commit_failed(&self) -> DraftStatus {
        self.status()
    }

    /// Cache entry for the current working copy.
    pub fn to_draft(&self) -> Draft {
        Draft::new(self.key, self.effective)
    }
}
