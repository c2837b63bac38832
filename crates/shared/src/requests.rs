//! Request bodies and query strings.
//!
//! These carry raw client input; validation happens server-side when the
//! engine turns them into domain value objects.

use familiar_domain::AttributeSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotentialsRequest {
    pub attributes: AttributeSet,
}

/// Create (no `id`) or fully replace (with `id`) a creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCreatureRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    pub attributes: AttributeSet,
    /// Defaults to every attribute at its cap.
    #[serde(default)]
    pub max_attributes: Option<AttributeSet>,
    #[serde(default)]
    pub talents: Vec<String>,
}

/// Listing metadata; missing fields take the marketplace defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCreatureRequest {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub amount: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThreadRequest {
    pub title: String,
    #[serde(alias = "content")]
    pub body: String,
    /// Category label or URL slug.
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Post under this name instead of the account's display name.
    #[serde(default)]
    pub persona_name: Option<String>,
    #[serde(default)]
    pub attached_creature_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostReplyRequest {
    #[serde(alias = "content")]
    pub body: String,
    #[serde(default)]
    pub persona_name: Option<String>,
}

/// Replaces the working attribute set of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDraftRequest {
    pub attributes: AttributeSet,
}

/// Everything a draft commit saves besides the draft's own attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDraftRequest {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub max_attributes: Option<AttributeSet>,
    /// Omitted keeps the creature's current talents.
    #[serde(default)]
    pub talents: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadListQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}
