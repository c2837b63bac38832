//! Response payloads, inlined into the action envelope on success.
//!
//! Timestamps are RFC 3339 strings; ids are raw UUIDs.

use familiar_domain::{AttributeSet, DraftStatus, Potentials};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialsResponse {
    pub potentials: Potentials,
    /// At-cap reference values.
    pub maximum: Potentials,
    pub total: i64,
}

// =============================================================================
// Write acknowledgements
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCreature {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedThread {
    pub thread_id: Uuid,
}

// =============================================================================
// Creatures
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureData {
    pub id: Uuid,
    pub nickname: Option<String>,
    pub species: String,
    pub school: String,
    pub age: String,
    pub attributes: AttributeSet,
    pub max_attributes: AttributeSet,
    pub talents: Vec<String>,
    pub potentials: Potentials,
    pub total: i64,
    pub listed: bool,
    /// Released creatures are only ever shown to their owner.
    pub released: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureList {
    pub creatures: Vec<CreatureData>,
}

// =============================================================================
// Marketplace
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceData {
    pub currency: String,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingData {
    pub id: Uuid,
    pub creature_id: Uuid,
    pub seller_name: String,
    pub seller_contact: Option<String>,
    pub nickname: Option<String>,
    pub species: String,
    pub school: String,
    pub age: String,
    pub attributes: AttributeSet,
    pub max_attributes: AttributeSet,
    pub talents: Vec<String>,
    pub potentials: Potentials,
    pub price: PriceData,
    pub listed_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingList {
    pub listings: Vec<ListingData>,
}

// =============================================================================
// Discussion board
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedAssetData {
    pub creature_id: Uuid,
    pub nickname: Option<String>,
    pub species: String,
    pub school: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadData {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub category: String,
    pub category_slug: String,
    pub author_name: String,
    pub tags: Vec<String>,
    pub attached_asset: Option<AttachedAssetData>,
    pub reply_count: u32,
    pub last_reply_at: String,
    pub last_reply_author_name: Option<String>,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadList {
    pub threads: Vec<ThreadData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    pub id: Uuid,
    pub author_name: String,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadDetail {
    pub thread: ThreadData,
    pub posts: Vec<PostData>,
}

// =============================================================================
// Drafts
// =============================================================================

/// Result of committing a draft: the saved creature and the now-clean draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedDraft {
    pub id: Uuid,
    pub draft: DraftView,
}

/// Working state of an attribute draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftView {
    /// `draft:new` or `draft:creature:<id>`.
    pub key: String,
    pub baseline: AttributeSet,
    pub effective: AttributeSet,
    pub potentials: Potentials,
    pub total: i64,
    pub status: DraftStatus,
}
