use std::sync::Arc;

use chrono::{TimeZone, Timelike, Utc};
use familiar_domain::{
    AccountId, AttributeSet, Author, Creature, CreatureProfile, ForumCategory, Identity, Listing,
    ListingPrice, Post, PostBody, Tags, Talents, Thread, ThreadTitle,
};
use tempfile::TempDir;

use super::SqliteStore;
use crate::infrastructure::clock::{FixedClock, SteppingClock, SystemClock};
use crate::infrastructure::ports::{
    ClockPort, CreatureRepo, ListingRepo, PreconditionFailed, RequestContext, ThreadRepo,
    TransactionPort, TxError, WriteBatch, WriteOp,
};
use crate::use_cases::listings::{ListCreature, ListCreatureInput};
use crate::use_cases::CoreError;

async fn open_with(clock: Arc<dyn ClockPort>) -> (TempDir, Arc<SqliteStore>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("familiar.db");
    let store = SqliteStore::open(path.to_str().unwrap(), clock)
        .await
        .unwrap();
    (dir, Arc::new(store))
}

async fn open() -> (TempDir, Arc<SqliteStore>) {
    open_with(Arc::new(SystemClock::new())).await
}

fn identity(id: &str) -> Identity {
    Identity::new(
        AccountId::new(id).unwrap(),
        Some("Ember Wizard"),
        Some("ember@example.com".to_string()),
    )
}

fn creature(owner: &Identity, nickname: &str) -> Creature {
    Creature::new(
        owner.account_id().clone(),
        CreatureProfile::new(Some(nickname), Some("Fire Cat"), Some("Fire"), Some("Teen")).unwrap(),
        AttributeSet::new(100, 90, 80, 70, 60),
        AttributeSet::at_cap(),
        Talents::new(["Spell-Proof", "Pain-Giver"]).unwrap(),
        Utc::now(),
    )
    .unwrap()
}

async fn insert(store: &SqliteStore, creature: &Creature) {
    store
        .commit(WriteBatch::new().with(WriteOp::InsertCreature(creature.clone())))
        .await
        .unwrap();
}

fn publish_batch(creature: &Creature, seller: &Identity) -> WriteBatch {
    WriteBatch::new()
        .with(WriteOp::SetCreatureListed {
            creature_id: creature.id(),
            expected: false,
            listed: true,
        })
        .with(WriteOp::InsertListing(Listing::publish(
            creature,
            seller,
            ListingPrice::default(),
            Utc::now(),
        )))
}

fn thread(author: &Identity, title: &str, category: ForumCategory) -> Thread {
    Thread::new(
        Author::new(author, None),
        ThreadTitle::new(title).unwrap(),
        PostBody::new("Opening post").unwrap(),
        category,
        Tags::new(["pets"]).unwrap(),
        Utc::now(),
    )
}

fn reply_batch(thread: &Thread, who: &Identity, body: &str) -> WriteBatch {
    let author = Author::new(who, None);
    let author_name = author.display_name().as_str().to_string();
    let post = Post::new(thread.id(), author, PostBody::new(body).unwrap(), Utc::now());
    WriteBatch::new()
        .with(WriteOp::InsertPost(post))
        .with(WriteOp::RecordReply {
            thread_id: thread.id(),
            author_name,
        })
}

fn precondition(result: Result<impl std::fmt::Debug, TxError>) -> PreconditionFailed {
    match result {
        Err(TxError::Precondition(p)) => p,
        other => panic!("expected precondition failure, got {other:?}"),
    }
}

// =============================================================================
// Creatures
// =============================================================================

#[tokio::test]
async fn creature_round_trips_with_commit_time() {
    let (_dir, store) = open().await;
    let owner = identity("user-1");
    let pet = creature(&owner, "Sparky");

    let receipt = store
        .commit(WriteBatch::new().with(WriteOp::InsertCreature(pet.clone())))
        .await
        .unwrap();

    let loaded = CreatureRepo::get(store.as_ref(), pet.id()).await.unwrap().unwrap();
    assert_eq!(loaded.id(), pet.id());
    assert_eq!(loaded.owner_id(), pet.owner_id());
    assert_eq!(loaded.profile(), pet.profile());
    assert_eq!(loaded.attributes(), pet.attributes());
    assert_eq!(loaded.max_attributes(), pet.max_attributes());
    assert_eq!(loaded.talents(), pet.talents());
    assert!(!loaded.is_listed());
    assert_eq!(loaded.created_at(), receipt.committed_at);
    assert_eq!(loaded.updated_at(), receipt.committed_at);
}

#[tokio::test]
async fn receipt_matches_stored_time_at_microsecond_precision() {
    let at = Utc
        .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .unwrap()
        .with_nanosecond(635_456_650)
        .unwrap();
    let (_dir, store) = open_with(Arc::new(FixedClock(at))).await;
    let pet = creature(&identity("user-1"), "Sparky");

    let receipt = store
        .commit(WriteBatch::new().with(WriteOp::InsertCreature(pet.clone())))
        .await
        .unwrap();

    assert_eq!(receipt.committed_at.nanosecond(), 635_456_000);
    let loaded = CreatureRepo::get(store.as_ref(), pet.id()).await.unwrap().unwrap();
    assert_eq!(loaded.created_at(), receipt.committed_at);
}

#[tokio::test]
async fn list_by_owner_is_newest_first_and_skips_released() {
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let (_dir, store) =
        open_with(Arc::new(SteppingClock::new(start, chrono::Duration::seconds(1)))).await;
    let owner = identity("user-1");
    let other = identity("user-2");

    let first = creature(&owner, "First");
    let second = creature(&owner, "Second");
    let gone = creature(&owner, "Gone");
    let theirs = creature(&other, "Theirs");
    for c in [&first, &second, &gone, &theirs] {
        insert(&store, c).await;
    }
    store
        .commit(WriteBatch::new().with(WriteOp::ReleaseCreature {
            creature_id: gone.id(),
        }))
        .await
        .unwrap();

    let mine = store.list_by_owner(owner.account_id()).await.unwrap();
    let ids: Vec<_> = mine.iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec![second.id(), first.id()]);
}

#[tokio::test]
async fn update_never_touches_listed_flag() {
    let (_dir, store) = open().await;
    let owner = identity("user-1");
    let mut pet = creature(&owner, "Sparky");
    insert(&store, &pet).await;
    store.commit(publish_batch(&pet, &owner)).await.unwrap();

    // The in-memory copy still says unlisted; the stored flag must survive.
    pet.revise(
        CreatureProfile::new(Some("Renamed"), None, None, None).unwrap(),
        AttributeSet::new(1, 2, 3, 4, 5),
        AttributeSet::at_cap(),
        Talents::default(),
        Utc::now(),
    )
    .unwrap();
    store
        .commit(WriteBatch::new().with(WriteOp::UpdateCreature(pet.clone())))
        .await
        .unwrap();

    let loaded = CreatureRepo::get(store.as_ref(), pet.id()).await.unwrap().unwrap();
    assert!(loaded.is_listed());
    assert_eq!(loaded.profile().display_name(), "Renamed");
    assert_eq!(loaded.attributes(), &AttributeSet::new(1, 2, 3, 4, 5));
}

#[tokio::test]
async fn saving_a_listed_creature_refreshes_its_listing() {
    let (_dir, store) = open().await;
    let owner = identity("user-1");
    let mut pet = creature(&owner, "Sparky");
    insert(&store, &pet).await;
    store.commit(publish_batch(&pet, &owner)).await.unwrap();

    pet.revise(
        CreatureProfile::new(Some("Blaze"), Some("Fire Cat"), Some("Fire"), Some("Adult")).unwrap(),
        AttributeSet::at_cap(),
        AttributeSet::at_cap(),
        Talents::default(),
        Utc::now(),
    )
    .unwrap();
    store
        .commit(WriteBatch::new().with(WriteOp::UpdateCreature(pet.clone())))
        .await
        .unwrap();

    let active = store.list_active(50).await.unwrap();
    assert_eq!(active.len(), 1);
    let snapshot = active[0].snapshot();
    assert_eq!(snapshot.nickname.as_deref(), Some("Blaze"));
    assert_eq!(snapshot.age, "Adult");
    assert_eq!(snapshot.attributes, AttributeSet::at_cap());
    assert_eq!(snapshot.potentials, pet.potentials());
    assert!(snapshot.talents.is_empty());
}

#[tokio::test]
async fn update_of_released_creature_fails() {
    let (_dir, store) = open().await;
    let owner = identity("user-1");
    let pet = creature(&owner, "Sparky");
    insert(&store, &pet).await;
    store
        .commit(WriteBatch::new().with(WriteOp::ReleaseCreature {
            creature_id: pet.id(),
        }))
        .await
        .unwrap();

    let result = store
        .commit(WriteBatch::new().with(WriteOp::UpdateCreature(pet.clone())))
        .await;
    assert_eq!(
        precondition(result),
        PreconditionFailed::Released {
            creature_id: pet.id()
        }
    );
}

#[tokio::test]
async fn missing_creature_is_reported() {
    let (_dir, store) = open().await;
    let pet = creature(&identity("user-1"), "Ghost");

    let result = store
        .commit(WriteBatch::new().with(WriteOp::UpdateCreature(pet.clone())))
        .await;
    assert!(matches!(
        precondition(result),
        PreconditionFailed::Missing { entity_type: "Creature", .. }
    ));
}

// =============================================================================
// Listings
// =============================================================================

#[tokio::test]
async fn second_publish_fails_and_leaves_one_active_listing() {
    let (_dir, store) = open().await;
    let owner = identity("user-1");
    let pet = creature(&owner, "Sparky");
    insert(&store, &pet).await;

    store.commit(publish_batch(&pet, &owner)).await.unwrap();
    let result = store.commit(publish_batch(&pet, &owner)).await;

    assert_eq!(
        precondition(result),
        PreconditionFailed::ListedFlag {
            creature_id: pet.id(),
            actual: true
        }
    );
    let active = store.list_active(50).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].creature_id(), pet.id());
    assert_eq!(active[0].seller_contact(), Some("ember@example.com"));
    assert_eq!(active[0].snapshot().nickname.as_deref(), Some("Sparky"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_publishes_leave_exactly_one_active_listing() {
    let (_dir, store) = open().await;
    let owner = identity("user-1");
    let pet = creature(&owner, "Sparky");
    insert(&store, &pet).await;

    let publish = Arc::new(ListCreature::new(
        store.clone(),
        store.clone(),
        Arc::new(SystemClock::new()),
    ));
    let ctx = RequestContext::authenticated(owner.clone());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let publish = publish.clone();
        let ctx = ctx.clone();
        let id = pet.id();
        handles.push(tokio::spawn(async move {
            publish.execute(&ctx, id, ListCreatureInput::default()).await
        }));
    }

    let mut published = 0;
    for result in futures_util::future::join_all(handles).await {
        match result.unwrap() {
            Ok(_) => published += 1,
            Err(CoreError::AlreadyListed) => {}
            Err(other) => panic!("unexpected failure: {other:?}"),
        }
    }

    assert_eq!(published, 1);
    assert_eq!(store.list_active(50).await.unwrap().len(), 1);
    let loaded = CreatureRepo::get(store.as_ref(), pet.id()).await.unwrap().unwrap();
    assert!(loaded.is_listed());
}

#[tokio::test]
async fn duplicate_active_listing_is_rejected_without_flag_guard() {
    let (_dir, store) = open().await;
    let owner = identity("user-1");
    let pet = creature(&owner, "Sparky");
    insert(&store, &pet).await;

    let listing = || {
        WriteBatch::new().with(WriteOp::InsertListing(Listing::publish(
            &pet,
            &owner,
            ListingPrice::default(),
            Utc::now(),
        )))
    };
    store.commit(listing()).await.unwrap();

    assert_eq!(
        precondition(store.commit(listing()).await),
        PreconditionFailed::DuplicateActiveListing {
            creature_id: pet.id()
        }
    );
}

#[tokio::test]
async fn failed_batch_rolls_back_earlier_ops() {
    let (_dir, store) = open().await;
    let owner = identity("user-1");
    let pet = creature(&owner, "Sparky");
    insert(&store, &pet).await;

    // Flag flips first, then the withdraw finds nothing to withdraw.
    let batch = WriteBatch::new()
        .with(WriteOp::SetCreatureListed {
            creature_id: pet.id(),
            expected: false,
            listed: true,
        })
        .with(WriteOp::WithdrawActiveListing {
            creature_id: pet.id(),
        });
    let result = store.commit(batch).await;

    assert_eq!(
        precondition(result),
        PreconditionFailed::NoActiveListing {
            creature_id: pet.id()
        }
    );
    let loaded = CreatureRepo::get(store.as_ref(), pet.id()).await.unwrap().unwrap();
    assert!(!loaded.is_listed());
}

#[tokio::test]
async fn unlist_withdraws_listing() {
    let (_dir, store) = open().await;
    let owner = identity("user-1");
    let pet = creature(&owner, "Sparky");
    insert(&store, &pet).await;
    store.commit(publish_batch(&pet, &owner)).await.unwrap();

    let batch = WriteBatch::new()
        .with(WriteOp::SetCreatureListed {
            creature_id: pet.id(),
            expected: true,
            listed: false,
        })
        .with(WriteOp::WithdrawActiveListing {
            creature_id: pet.id(),
        });
    store.commit(batch).await.unwrap();

    assert!(store.list_active(50).await.unwrap().is_empty());
    let withdrawn: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM listings WHERE status = 'withdrawn' AND withdrawn_at IS NOT NULL",
    )
    .fetch_one(store.pool())
    .await
    .unwrap();
    assert_eq!(withdrawn, 1);

    // Relisting after a withdrawal is allowed.
    store.commit(publish_batch(&pet, &owner)).await.unwrap();
    assert_eq!(store.list_active(50).await.unwrap().len(), 1);
}

#[tokio::test]
async fn releasing_a_listed_creature_requires_unlisting_first() {
    let (_dir, store) = open().await;
    let owner = identity("user-1");
    let pet = creature(&owner, "Sparky");
    insert(&store, &pet).await;
    store.commit(publish_batch(&pet, &owner)).await.unwrap();

    let bare = store
        .commit(WriteBatch::new().with(WriteOp::ReleaseCreature {
            creature_id: pet.id(),
        }))
        .await;
    assert_eq!(
        precondition(bare),
        PreconditionFailed::ListedFlag {
            creature_id: pet.id(),
            actual: true
        }
    );

    let full = WriteBatch::new()
        .with(WriteOp::SetCreatureListed {
            creature_id: pet.id(),
            expected: true,
            listed: false,
        })
        .with(WriteOp::WithdrawActiveListing {
            creature_id: pet.id(),
        })
        .with(WriteOp::ReleaseCreature {
            creature_id: pet.id(),
        });
    store.commit(full).await.unwrap();

    let loaded = CreatureRepo::get(store.as_ref(), pet.id()).await.unwrap().unwrap();
    assert!(loaded.is_released());
    assert!(!loaded.is_listed());
    assert!(store.list_active(50).await.unwrap().is_empty());
}

#[tokio::test]
async fn marketplace_respects_limit_and_order() {
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let (_dir, store) =
        open_with(Arc::new(SteppingClock::new(start, chrono::Duration::seconds(1)))).await;
    let owner = identity("user-1");

    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let pet = creature(&owner, name);
        insert(&store, &pet).await;
        store.commit(publish_batch(&pet, &owner)).await.unwrap();
        ids.push(pet.id());
    }

    let active = store.list_active(2).await.unwrap();
    let listed: Vec<_> = active.iter().map(|l| l.creature_id()).collect();
    assert_eq!(listed, vec![ids[2], ids[1]]);
}

// =============================================================================
// Threads
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_replies_are_all_counted() {
    let (_dir, store) = open().await;
    let op = identity("user-1");
    let topic = thread(&op, "Best pets?", ForumCategory::PetPavilion);
    store
        .commit(WriteBatch::new().with(WriteOp::InsertThread(topic.clone())))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        let batch = reply_batch(&topic, &identity(&format!("user-{i}")), &format!("reply {i}"));
        handles.push(tokio::spawn(async move { store.commit(batch).await }));
    }
    for result in futures_util::future::join_all(handles).await {
        result.unwrap().unwrap();
    }

    let loaded = ThreadRepo::get(store.as_ref(), topic.id()).await.unwrap().unwrap();
    let posts = store.list_posts(topic.id()).await.unwrap();
    assert_eq!(loaded.reply_count(), 20);
    assert_eq!(posts.len(), 20);

    let newest = posts.iter().map(|p| p.created_at()).max().unwrap();
    assert_eq!(loaded.last_reply_at(), newest);
    assert_eq!(loaded.last_reply_author_name(), Some("Ember Wizard"));
}

#[tokio::test]
async fn locked_thread_rejects_replies() {
    let (_dir, store) = open().await;
    let op = identity("user-1");
    let topic = thread(&op, "Announcements", ForumCategory::General);
    store
        .commit(WriteBatch::new().with(WriteOp::InsertThread(topic.clone())))
        .await
        .unwrap();
    sqlx::query("UPDATE threads SET is_locked = 1 WHERE id = ?")
        .bind(topic.id().to_string())
        .execute(store.pool())
        .await
        .unwrap();

    let result = store.commit(reply_batch(&topic, &op, "hello?")).await;

    assert_eq!(
        precondition(result),
        PreconditionFailed::ThreadLocked {
            thread_id: topic.id()
        }
    );
    let loaded = ThreadRepo::get(store.as_ref(), topic.id()).await.unwrap().unwrap();
    assert!(loaded.is_locked());
    assert_eq!(loaded.reply_count(), 0);
    assert!(store.list_posts(topic.id()).await.unwrap().is_empty());
}

#[tokio::test]
async fn reply_to_missing_thread_fails() {
    let (_dir, store) = open().await;
    let op = identity("user-1");
    let never_saved = thread(&op, "Phantom", ForumCategory::General);

    let result = store.commit(reply_batch(&never_saved, &op, "anyone?")).await;
    assert!(matches!(
        precondition(result),
        PreconditionFailed::Missing { entity_type: "Thread", .. }
    ));
}

#[tokio::test]
async fn board_lists_pinned_then_recent_activity() {
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let (_dir, store) =
        open_with(Arc::new(SteppingClock::new(start, chrono::Duration::seconds(1)))).await;
    let op = identity("user-1");

    let older = thread(&op, "Older", ForumCategory::Pvp);
    let newer = thread(&op, "Newer", ForumCategory::Pvp);
    let elsewhere = thread(&op, "Elsewhere", ForumCategory::Feedback);
    for t in [&older, &newer, &elsewhere] {
        store
            .commit(WriteBatch::new().with(WriteOp::InsertThread(t.clone())))
            .await
            .unwrap();
    }

    let pvp = store.list(Some(ForumCategory::Pvp), 20).await.unwrap();
    let ids: Vec<_> = pvp.iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec![newer.id(), older.id()]);

    // A reply bumps the older thread to the top.
    store.commit(reply_batch(&older, &op, "bump")).await.unwrap();
    let pvp = store.list(Some(ForumCategory::Pvp), 20).await.unwrap();
    assert_eq!(pvp[0].id(), older.id());

    // Pinned beats activity.
    sqlx::query("UPDATE threads SET is_pinned = 1 WHERE id = ?")
        .bind(elsewhere.id().to_string())
        .execute(store.pool())
        .await
        .unwrap();
    let all = store.list(None, 20).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id(), elsewhere.id());
    assert!(all[0].is_pinned());
}

#[tokio::test]
async fn thread_keeps_persona_tags_and_attachment() {
    let (_dir, store) = open().await;
    let op = identity("user-1");
    let pet = creature(&op, "Sparky");
    let topic = Thread::new(
        Author::new(&op, Some(familiar_domain::DisplayName::new("Malorn").unwrap())),
        ThreadTitle::new("Rate my cat").unwrap(),
        PostBody::new("Thoughts?").unwrap(),
        ForumCategory::PetPavilion,
        Tags::new(["cats", "fire"]).unwrap(),
        Utc::now(),
    )
    .with_attached_asset(familiar_domain::AttachedAsset::of(&pet));
    store
        .commit(WriteBatch::new().with(WriteOp::InsertThread(topic.clone())))
        .await
        .unwrap();

    let loaded = ThreadRepo::get(store.as_ref(), topic.id()).await.unwrap().unwrap();
    assert_eq!(loaded.author().display_name().as_str(), "Malorn");
    assert_eq!(loaded.author().account_name().as_str(), "Ember Wizard");
    assert_eq!(loaded.tags(), topic.tags());
    assert_eq!(loaded.attached_asset(), topic.attached_asset());
    assert_eq!(loaded.category(), ForumCategory::PetPavilion);
    assert_eq!(loaded.reply_count(), 0);
    assert_eq!(loaded.last_reply_at(), loaded.created_at());
}
