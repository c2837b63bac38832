//! Atomic batch commit.

use async_trait::async_trait;
use chrono::SubsecRound;
use familiar_domain::{Creature, CreatureId, CreatureSnapshot, Listing, Post, Thread, ThreadId};
use sqlx::{Row, SqliteConnection};

use super::rows::{encode_time, to_json};
use super::SqliteStore;
use crate::infrastructure::ports::{
    CommitReceipt, PreconditionFailed, TransactionPort, TxError, WriteBatch, WriteOp,
};

#[async_trait]
impl TransactionPort for SqliteStore {
    async fn commit(&self, batch: WriteBatch) -> Result<CommitReceipt, TxError> {
        let _writer = self.writer.lock().await;
        // Stored timestamps keep microseconds; the receipt must match them.
        let committed_at = self.clock.now().trunc_subsecs(6);
        let stamp = encode_time(committed_at);
        let op_count = batch.len();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| TxError::store("begin", e))?;

        // Dropping `tx` on an early return rolls the whole batch back.
        for op in batch.into_ops() {
            apply(&mut *tx, op, &stamp).await?;
        }

        tx.commit().await.map_err(|e| TxError::store("commit", e))?;
        tracing::debug!(ops = op_count, committed_at = %stamp, "Committed write batch");

        Ok(CommitReceipt { committed_at })
    }
}

async fn apply(conn: &mut SqliteConnection, op: WriteOp, stamp: &str) -> Result<(), TxError> {
    match op {
        WriteOp::InsertCreature(creature) => insert_creature(conn, &creature, stamp).await,
        WriteOp::UpdateCreature(creature) => update_creature(conn, &creature, stamp).await,
        WriteOp::SetCreatureListed {
            creature_id,
            expected,
            listed,
        } => set_listed(conn, creature_id, expected, listed, stamp).await,
        WriteOp::ReleaseCreature { creature_id } => release_creature(conn, creature_id, stamp).await,
        WriteOp::InsertListing(listing) => insert_listing(conn, &listing, stamp).await,
        WriteOp::WithdrawActiveListing { creature_id } => {
            withdraw_listing(conn, creature_id, stamp).await
        }
        WriteOp::InsertThread(thread) => insert_thread(conn, &thread, stamp).await,
        WriteOp::InsertPost(post) => insert_post(conn, &post, stamp).await,
        WriteOp::RecordReply {
            thread_id,
            author_name,
        } => record_reply(conn, thread_id, &author_name, stamp).await,
    }
}

// =============================================================================
// Creatures
// =============================================================================

struct CreatureState {
    listed: bool,
    released: bool,
}

async fn creature_state(
    conn: &mut SqliteConnection,
    id: CreatureId,
) -> Result<Option<CreatureState>, TxError> {
    let row = sqlx::query("SELECT listed, released FROM creatures WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| TxError::store("creature_state", e))?;

    row.map(|r| {
        Ok(CreatureState {
            listed: r.try_get("listed").map_err(|e| TxError::store("creature_state", e))?,
            released: r
                .try_get("released")
                .map_err(|e| TxError::store("creature_state", e))?,
        })
    })
    .transpose()
}

fn missing_creature(id: CreatureId) -> TxError {
    PreconditionFailed::Missing {
        entity_type: "Creature",
        id: id.to_string(),
    }
    .into()
}

/// Explains why a guarded creature update matched no row.
async fn creature_guard_failure(conn: &mut SqliteConnection, id: CreatureId) -> TxError {
    match creature_state(conn, id).await {
        Err(e) => e,
        Ok(None) => missing_creature(id),
        Ok(Some(state)) if state.released => {
            PreconditionFailed::Released { creature_id: id }.into()
        }
        Ok(Some(state)) => PreconditionFailed::ListedFlag {
            creature_id: id,
            actual: state.listed,
        }
        .into(),
    }
}

struct CreatureColumns {
    nickname: Option<String>,
    species: String,
    school: String,
    age: String,
    attributes: String,
    max_attributes: String,
    talents: String,
}

fn creature_columns(creature: &Creature) -> Result<CreatureColumns, TxError> {
    let profile = creature.profile();
    let encode = |e: serde_json::Error| TxError::store("encode_creature", e);
    Ok(CreatureColumns {
        nickname: profile.nickname().map(|n| n.as_str().to_string()),
        species: profile.species().as_str().to_string(),
        school: profile.school().as_str().to_string(),
        age: profile.age().as_str().to_string(),
        attributes: to_json(creature.attributes()).map_err(encode)?,
        max_attributes: to_json(creature.max_attributes()).map_err(encode)?,
        talents: to_json(creature.talents()).map_err(encode)?,
    })
}

async fn insert_creature(
    conn: &mut SqliteConnection,
    creature: &Creature,
    stamp: &str,
) -> Result<(), TxError> {
    let cols = creature_columns(creature)?;
    sqlx::query(
        r#"
        INSERT INTO creatures (
            id, owner_id, nickname, species, school, age,
            attributes_json, max_attributes_json, talents_json,
            listed, released, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?)
        "#,
    )
    .bind(creature.id().to_string())
    .bind(creature.owner_id().as_str())
    .bind(cols.nickname)
    .bind(cols.species)
    .bind(cols.school)
    .bind(cols.age)
    .bind(cols.attributes)
    .bind(cols.max_attributes)
    .bind(cols.talents)
    .bind(stamp)
    .bind(stamp)
    .execute(&mut *conn)
    .await
    .map_err(|e| TxError::store("insert_creature", e))?;
    Ok(())
}

async fn update_creature(
    conn: &mut SqliteConnection,
    creature: &Creature,
    stamp: &str,
) -> Result<(), TxError> {
    let cols = creature_columns(creature)?;
    let result = sqlx::query(
        r#"
        UPDATE creatures
        SET nickname = ?, species = ?, school = ?, age = ?,
            attributes_json = ?, max_attributes_json = ?, talents_json = ?,
            updated_at = ?
        WHERE id = ? AND released = 0
        "#,
    )
    .bind(cols.nickname)
    .bind(cols.species)
    .bind(cols.school)
    .bind(cols.age)
    .bind(cols.attributes)
    .bind(cols.max_attributes)
    .bind(cols.talents)
    .bind(stamp)
    .bind(creature.id().to_string())
    .execute(&mut *conn)
    .await
    .map_err(|e| TxError::store("update_creature", e))?;

    if result.rows_affected() == 0 {
        return Err(creature_guard_failure(conn, creature.id()).await);
    }
    refresh_listing_snapshot(conn, creature).await
}

/// Keeps an active listing showing the creature as it was last saved.
async fn refresh_listing_snapshot(
    conn: &mut SqliteConnection,
    creature: &Creature,
) -> Result<(), TxError> {
    let snapshot = to_json(&CreatureSnapshot::of(creature))
        .map_err(|e| TxError::store("encode_listing", e))?;

    sqlx::query("UPDATE listings SET snapshot_json = ? WHERE creature_id = ? AND status = 'active'")
        .bind(snapshot)
        .bind(creature.id().to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| TxError::store("refresh_listing_snapshot", e))?;
    Ok(())
}

async fn set_listed(
    conn: &mut SqliteConnection,
    id: CreatureId,
    expected: bool,
    listed: bool,
    stamp: &str,
) -> Result<(), TxError> {
    let result = sqlx::query(
        r#"
        UPDATE creatures SET listed = ?, updated_at = ?
        WHERE id = ? AND listed = ? AND released = 0
        "#,
    )
    .bind(listed)
    .bind(stamp)
    .bind(id.to_string())
    .bind(expected)
    .execute(&mut *conn)
    .await
    .map_err(|e| TxError::store("set_creature_listed", e))?;

    if result.rows_affected() == 0 {
        return Err(creature_guard_failure(conn, id).await);
    }
    Ok(())
}

async fn release_creature(
    conn: &mut SqliteConnection,
    id: CreatureId,
    stamp: &str,
) -> Result<(), TxError> {
    let result = sqlx::query(
        r#"
        UPDATE creatures SET released = 1, updated_at = ?
        WHERE id = ? AND released = 0 AND listed = 0
        "#,
    )
    .bind(stamp)
    .bind(id.to_string())
    .execute(&mut *conn)
    .await
    .map_err(|e| TxError::store("release_creature", e))?;

    if result.rows_affected() == 0 {
        return Err(creature_guard_failure(conn, id).await);
    }
    Ok(())
}

// =============================================================================
// Listings
// =============================================================================

async fn has_active_listing(conn: &mut SqliteConnection, id: CreatureId) -> Result<bool, TxError> {
    let row = sqlx::query("SELECT 1 FROM listings WHERE creature_id = ? AND status = 'active'")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| TxError::store("active_listing", e))?;
    Ok(row.is_some())
}

async fn insert_listing(
    conn: &mut SqliteConnection,
    listing: &Listing,
    stamp: &str,
) -> Result<(), TxError> {
    let creature_id = listing.creature_id();
    if creature_state(conn, creature_id).await?.is_none() {
        return Err(missing_creature(creature_id));
    }
    if has_active_listing(conn, creature_id).await? {
        return Err(PreconditionFailed::DuplicateActiveListing { creature_id }.into());
    }

    let snapshot =
        to_json(listing.snapshot()).map_err(|e| TxError::store("encode_listing", e))?;

    sqlx::query(
        r#"
        INSERT INTO listings (
            id, creature_id, seller_id, seller_name, seller_contact,
            snapshot_json, price_currency, price_amount, status, listed_at, withdrawn_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'active', ?, NULL)
        "#,
    )
    .bind(listing.id().to_string())
    .bind(creature_id.to_string())
    .bind(listing.seller_id().as_str())
    .bind(listing.seller_name().as_str())
    .bind(listing.seller_contact())
    .bind(snapshot)
    .bind(listing.price().currency())
    .bind(i64::from(listing.price().amount()))
    .bind(stamp)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        // The partial unique index is the last line against a second active listing.
        let unique = e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if unique {
            TxError::from(PreconditionFailed::DuplicateActiveListing { creature_id })
        } else {
            TxError::store("insert_listing", e)
        }
    })?;
    Ok(())
}

async fn withdraw_listing(
    conn: &mut SqliteConnection,
    creature_id: CreatureId,
    stamp: &str,
) -> Result<(), TxError> {
    let result = sqlx::query(
        r#"
        UPDATE listings SET status = 'withdrawn', withdrawn_at = ?
        WHERE creature_id = ? AND status = 'active'
        "#,
    )
    .bind(stamp)
    .bind(creature_id.to_string())
    .execute(&mut *conn)
    .await
    .map_err(|e| TxError::store("withdraw_listing", e))?;

    if result.rows_affected() == 0 {
        return Err(PreconditionFailed::NoActiveListing { creature_id }.into());
    }
    Ok(())
}

// =============================================================================
// Threads and posts
// =============================================================================

/// Fails unless the thread exists and is unlocked.
async fn ensure_thread_open(conn: &mut SqliteConnection, id: ThreadId) -> Result<(), TxError> {
    let row = sqlx::query("SELECT is_locked FROM threads WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| TxError::store("thread_state", e))?;

    let Some(row) = row else {
        return Err(PreconditionFailed::Missing {
            entity_type: "Thread",
            id: id.to_string(),
        }
        .into());
    };
    let locked: bool = row
        .try_get("is_locked")
        .map_err(|e| TxError::store("thread_state", e))?;
    if locked {
        return Err(PreconditionFailed::ThreadLocked { thread_id: id }.into());
    }
    Ok(())
}

async fn insert_thread(
    conn: &mut SqliteConnection,
    thread: &Thread,
    stamp: &str,
) -> Result<(), TxError> {
    let encode = |e: serde_json::Error| TxError::store("encode_thread", e);
    let tags = to_json(thread.tags()).map_err(encode)?;
    let asset = thread
        .attached_asset()
        .map(to_json)
        .transpose()
        .map_err(encode)?;
    let author = thread.author();

    sqlx::query(
        r#"
        INSERT INTO threads (
            id, author_id, author_name, persona_name, title, body, category,
            tags_json, attached_asset_json, reply_count, last_reply_at,
            last_reply_author_name, is_pinned, is_locked, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, NULL, ?, ?, ?)
        "#,
    )
    .bind(thread.id().to_string())
    .bind(author.account_id().as_str())
    .bind(author.account_name().as_str())
    .bind(author.persona().map(|p| p.as_str()))
    .bind(thread.title().as_str())
    .bind(thread.body().as_str())
    .bind(thread.category().slug())
    .bind(tags)
    .bind(asset)
    .bind(stamp)
    .bind(thread.is_pinned())
    .bind(thread.is_locked())
    .bind(stamp)
    .execute(&mut *conn)
    .await
    .map_err(|e| TxError::store("insert_thread", e))?;
    Ok(())
}

async fn insert_post(conn: &mut SqliteConnection, post: &Post, stamp: &str) -> Result<(), TxError> {
    ensure_thread_open(conn, post.thread_id()).await?;
    let author = post.author();

    sqlx::query(
        r#"
        INSERT INTO posts (id, thread_id, author_id, author_name, persona_name, body, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(post.id().to_string())
    .bind(post.thread_id().to_string())
    .bind(author.account_id().as_str())
    .bind(author.account_name().as_str())
    .bind(author.persona().map(|p| p.as_str()))
    .bind(post.body().as_str())
    .bind(stamp)
    .execute(&mut *conn)
    .await
    .map_err(|e| TxError::store("insert_post", e))?;
    Ok(())
}

async fn record_reply(
    conn: &mut SqliteConnection,
    thread_id: ThreadId,
    author_name: &str,
    stamp: &str,
) -> Result<(), TxError> {
    let result = sqlx::query(
        r#"
        UPDATE threads
        SET reply_count = reply_count + 1, last_reply_at = ?, last_reply_author_name = ?
        WHERE id = ? AND is_locked = 0
        "#,
    )
    .bind(stamp)
    .bind(author_name)
    .bind(thread_id.to_string())
    .execute(&mut *conn)
    .await
    .map_err(|e| TxError::store("record_reply", e))?;

    if result.rows_affected() == 0 {
        ensure_thread_open(conn, thread_id).await?;
        return Err(TxError::store("record_reply", "no thread row updated"));
    }
    Ok(())
}
