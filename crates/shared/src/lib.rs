//! Familiar Shared - wire contract between the engine and its clients
//!
//! This crate contains:
//! - Request bodies and query strings
//! - Response payloads
//! - The `{ success, error }` action envelope and its error codes
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, uuid and the domain vocabulary
//! 2. **No business logic** - Pure data types and serialization
//! 3. **No domain IDs** - use raw `uuid::Uuid` in DTOs

pub mod envelope;
pub mod requests;
pub mod responses;

pub use envelope::{ActionError, ActionResponse, ErrorCode};
pub use requests::{
    CommitDraftRequest, CreateThreadRequest, ListCreatureRequest, MarketplaceQuery,
    PostReplyRequest, PotentialsRequest, SaveCreatureRequest, ThreadListQuery, UpdateDraftRequest,
};
pub use responses::{
    Ack, AttachedAssetData, CommittedDraft, CreatedThread, CreatureData, CreatureList, DraftView,
    Health, ListingData, ListingList, PostData, PotentialsResponse, PriceData, SavedCreature,
    ThreadData, ThreadDetail, ThreadList,
};
