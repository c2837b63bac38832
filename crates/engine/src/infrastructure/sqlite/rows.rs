//! Row <-> aggregate mapping.
//!
//! Timestamps are stored as RFC 3339 UTC text with a fixed microsecond width,
//! so lexical order in SQL matches chronological order.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use familiar_domain::{
    AccountId, AttachedAsset, AttributeSet, Author, Creature, CreatureId, CreatureProfile,
    CreatureSnapshot, DisplayName, DomainError, ForumCategory, Listing, ListingId, ListingPrice,
    Post, PostBody, PostId, Tags, Talents, Thread, ThreadId, ThreadTitle,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::infrastructure::ports::RepoError;

pub(super) fn encode_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(format!("bad timestamp {raw:?}: {e}")))
}

pub(super) fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

fn from_json<T: DeserializeOwned>(raw: &str) -> Result<T, RepoError> {
    serde_json::from_str(raw).map_err(RepoError::serialization)
}

fn invalid(e: DomainError) -> RepoError {
    RepoError::serialization(e)
}

fn col<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, RepoError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name).map_err(|e| RepoError::database("decode", e))
}

fn time_col(row: &SqliteRow, name: &str) -> Result<DateTime<Utc>, RepoError> {
    let raw: String = col(row, name)?;
    decode_time(&raw)
}

// =============================================================================
// Creatures
// =============================================================================

pub(super) fn creature_from_row(row: &SqliteRow) -> Result<Creature, RepoError> {
    let id: String = col(row, "id")?;
    let owner: String = col(row, "owner_id")?;
    let nickname: Option<String> = col(row, "nickname")?;
    let species: String = col(row, "species")?;
    let school: String = col(row, "school")?;
    let age: String = col(row, "age")?;
    let attributes: AttributeSet = from_json(&col::<String>(row, "attributes_json")?)?;
    let max_attributes: AttributeSet = from_json(&col::<String>(row, "max_attributes_json")?)?;
    let talents: Talents = from_json(&col::<String>(row, "talents_json")?)?;
    let created_at = time_col(row, "created_at")?;
    let updated_at = time_col(row, "updated_at")?;

    let profile = CreatureProfile::new(
        nickname.as_deref(),
        Some(&species),
        Some(&school),
        Some(&age),
    )
    .map_err(invalid)?;

    let listed: bool = col(row, "listed")?;
    let released: bool = col(row, "released")?;

    let creature = Creature::new(
        AccountId::new(owner).map_err(invalid)?,
        profile,
        attributes,
        max_attributes,
        talents,
        created_at,
    )
    .map_err(invalid)?;

    Ok(creature
        .with_id(CreatureId::from_str(&id).map_err(invalid)?)
        .with_listed(listed)
        .with_released(released)
        .with_timestamps(created_at, updated_at))
}

// =============================================================================
// Listings
// =============================================================================

pub(super) fn listing_from_row(row: &SqliteRow) -> Result<Listing, RepoError> {
    let id: String = col(row, "id")?;
    let creature_id: String = col(row, "creature_id")?;
    let seller_id: String = col(row, "seller_id")?;
    let seller_name: String = col(row, "seller_name")?;
    let seller_contact: Option<String> = col(row, "seller_contact")?;
    let snapshot: CreatureSnapshot = from_json(&col::<String>(row, "snapshot_json")?)?;
    let currency: String = col(row, "price_currency")?;
    let amount: i64 = col(row, "price_amount")?;
    let listed_at = time_col(row, "listed_at")?;
    let withdrawn_at = col::<Option<String>>(row, "withdrawn_at")?
        .as_deref()
        .map(decode_time)
        .transpose()?;

    let amount = u32::try_from(amount)
        .map_err(|_| RepoError::serialization(format!("price out of range: {amount}")))?;

    Ok(Listing::restore(
        ListingId::from_str(&id).map_err(invalid)?,
        CreatureId::from_str(&creature_id).map_err(invalid)?,
        AccountId::new(seller_id).map_err(invalid)?,
        DisplayName::new(seller_name).map_err(invalid)?,
        seller_contact,
        snapshot,
        ListingPrice::new(currency, amount).map_err(invalid)?,
        listed_at,
    )
    .with_withdrawn_at(withdrawn_at))
}

// =============================================================================
// Threads and posts
// =============================================================================

fn author_from_row(row: &SqliteRow) -> Result<Author, RepoError> {
    let author_id: String = col(row, "author_id")?;
    let author_name: String = col(row, "author_name")?;
    let persona = col::<Option<String>>(row, "persona_name")?
        .map(DisplayName::new)
        .transpose()
        .map_err(invalid)?;

    Ok(Author::restore(
        AccountId::new(author_id).map_err(invalid)?,
        DisplayName::new(author_name).map_err(invalid)?,
        persona,
    ))
}

pub(super) fn thread_from_row(row: &SqliteRow) -> Result<Thread, RepoError> {
    let id: String = col(row, "id")?;
    let title: String = col(row, "title")?;
    let body: String = col(row, "body")?;
    let category: String = col(row, "category")?;
    let tags: Tags = from_json(&col::<String>(row, "tags_json")?)?;
    let attached: Option<AttachedAsset> = col::<Option<String>>(row, "attached_asset_json")?
        .as_deref()
        .map(from_json)
        .transpose()?;
    let reply_count: i64 = col(row, "reply_count")?;
    let last_reply_at = time_col(row, "last_reply_at")?;
    let last_reply_author_name: Option<String> = col(row, "last_reply_author_name")?;
    let is_pinned: bool = col(row, "is_pinned")?;
    let is_locked: bool = col(row, "is_locked")?;
    let created_at = time_col(row, "created_at")?;

    let reply_count = u32::try_from(reply_count)
        .map_err(|_| RepoError::serialization(format!("reply count out of range: {reply_count}")))?;

    let mut thread = Thread::new(
        author_from_row(row)?,
        ThreadTitle::new(title).map_err(invalid)?,
        PostBody::new(body).map_err(invalid)?,
        ForumCategory::from_str(&category).map_err(invalid)?,
        tags,
        created_at,
    )
    .with_id(ThreadId::from_str(&id).map_err(invalid)?)
    .with_flags(is_pinned, is_locked)
    .with_reply_state(reply_count, last_reply_at, last_reply_author_name);

    if let Some(asset) = attached {
        thread = thread.with_attached_asset(asset);
    }
    Ok(thread)
}

pub(super) fn post_from_row(row: &SqliteRow) -> Result<Post, RepoError> {
    let id: String = col(row, "id")?;
    let thread_id: String = col(row, "thread_id")?;
    let body: String = col(row, "body")?;
    let created_at = time_col(row, "created_at")?;

    Ok(Post::new(
        ThreadId::from_str(&thread_id).map_err(invalid)?,
        author_from_row(row)?,
        PostBody::new(body).map_err(invalid)?,
        created_at,
    )
    .with_id(PostId::from_str(&id).map_err(invalid)?))
}
