//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate:
//! - Has a unique identity
//! - Exposes behavior through methods, not public fields
//! - Guards its own state transitions (listing, release, thread locking)
//!
//! Persisted state is restored through `with_*`/`restore` builders so storage
//! adapters never bypass value-object validation.

pub mod creature;
pub mod listing;
pub mod thread;

pub use creature::{
    Creature, CreatureProfile, ReleaseOutcome, DEFAULT_AGE, DEFAULT_SCHOOL, DEFAULT_SPECIES,
};
pub use listing::{CreatureSnapshot, Listing, ListingStatus};
pub use thread::{AttachedAsset, Author, Post, Thread};
