//! Familiar domain: creatures, their attribute potentials, marketplace
//! listings and the discussion board. Pure types and rules, no I/O.

pub mod aggregates;
pub mod draft;
pub mod error;
pub mod ids;
pub mod potentials;
pub mod value_objects;

pub use aggregates::{
    AttachedAsset, Author, Creature, CreatureProfile, CreatureSnapshot, Listing, ListingStatus,
    Post, ReleaseOutcome, Thread,
};
pub use draft::{reconcile, Draft, DraftEditor, DraftKey, DraftStatus, Reconciled};
pub use error::DomainError;
pub use ids::{CreatureId, ListingId, PostId, ThreadId};
pub use potentials::{
    compute_potentials, DamagePotentials, PiercePotentials, Potentials, ResistPotentials,
};
pub use value_objects::{
    AccountId, Attribute, AttributeSet, CreatureLabel, DisplayName, ForumCategory, Identity,
    ListingPrice, Nickname, PostBody, Tags, TalentName, Talents, ThreadTitle,
};
