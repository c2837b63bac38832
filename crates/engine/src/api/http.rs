//! HTTP routes.
//!
//! Every handler answers with the action envelope: the payload inlined next to
//! `"success": true`, or an [`ApiError`] rendered as `"success": false`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::request::Parts,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use familiar_domain::{
    Creature, CreatureId, DraftEditor, DraftKey, Listing, Post, Thread, ThreadId,
};
use familiar_shared::{
    Ack, ActionResponse, AttachedAssetData, CommitDraftRequest, CommittedDraft,
    CreateThreadRequest, CreatedThread, CreatureData, CreatureList, DraftView, Health, ListCreatureRequest,
    ListingData, ListingList, MarketplaceQuery, PostData, PostReplyRequest, PotentialsRequest,
    PotentialsResponse, PriceData, SaveCreatureRequest, SavedCreature, ThreadData, ThreadDetail,
    ThreadList, ThreadListQuery, UpdateDraftRequest,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::error::ApiError;
use super::identity::Caller;
use crate::app::App;
use crate::use_cases::{
    board::{CreateThreadInput, PostReplyInput},
    creatures::SaveCreatureInput,
    listings::ListCreatureInput,
    CommitDetails,
};

type ApiResult<T> = Result<Json<ActionResponse<T>>, ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ActionResponse::ok(data)))
}

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/potentials", post(compute_potentials))
        .route("/api/creatures", get(my_creatures).post(save_creature))
        .route("/api/creatures/{id}", get(get_creature))
        .route(
            "/api/creatures/{id}/listing",
            post(list_creature).delete(unlist_creature),
        )
        .route("/api/creatures/{id}/release", post(release_creature))
        .route("/api/listings", get(marketplace))
        .route("/api/threads", get(list_threads).post(create_thread))
        .route("/api/threads/{id}", get(get_thread))
        .route("/api/threads/{id}/replies", post(post_reply))
        .route(
            "/api/drafts/{key}",
            get(open_draft).put(update_draft).delete(discard_draft),
        )
        .route("/api/drafts/{key}/commit", post(commit_draft))
}

// =============================================================================
// Extractors
// =============================================================================

/// JSON body whose rejection is rendered in the action envelope.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Ok(Self(value))
    }
}

/// Query string whose rejection is rendered in the action envelope.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Ok(Self(value))
    }
}

/// Parses an optional JSON body; an empty body means all defaults.
fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(e.to_string()))
}

fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("invalid {what} id")))
}

/// `new` for the calculator draft, otherwise a creature id.
fn parse_draft_key(raw: &str) -> Result<DraftKey, ApiError> {
    if raw.eq_ignore_ascii_case("new") {
        return Ok(DraftKey::New);
    }
    parse_uuid(raw, "creature").map(|id| DraftKey::Creature(CreatureId::from_uuid(id)))
}

// =============================================================================
// Conversions
// =============================================================================

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn creature_data(creature: &Creature) -> CreatureData {
    let profile = creature.profile();
    CreatureData {
        id: creature.id().to_uuid(),
        nickname: profile.nickname().map(|n| n.as_str().to_string()),
        species: profile.species().as_str().to_string(),
        school: profile.school().as_str().to_string(),
        age: profile.age().as_str().to_string(),
        attributes: *creature.attributes(),
        max_attributes: *creature.max_attributes(),
        talents: creature.talents().names(),
        potentials: creature.potentials(),
        total: creature.attributes().total(),
        listed: creature.is_listed(),
        released: creature.is_released(),
        created_at: timestamp(creature.created_at()),
        updated_at: timestamp(creature.updated_at()),
    }
}

fn listing_data(listing: &Listing) -> ListingData {
    let snapshot = listing.snapshot();
    ListingData {
        id: listing.id().to_uuid(),
        creature_id: listing.creature_id().to_uuid(),
        seller_name: listing.seller_name().as_str().to_string(),
        seller_contact: listing.seller_contact().map(str::to_string),
        nickname: snapshot.nickname.clone(),
        species: snapshot.species.clone(),
        school: snapshot.school.clone(),
        age: snapshot.age.clone(),
        attributes: snapshot.attributes,
        max_attributes: snapshot.max_attributes,
        talents: snapshot.talents.clone(),
        potentials: snapshot.potentials,
        price: PriceData {
            currency: listing.price().currency().to_string(),
            amount: listing.price().amount(),
        },
        listed_at: timestamp(listing.listed_at()),
    }
}

fn thread_data(thread: &Thread) -> ThreadData {
    ThreadData {
        id: thread.id().to_uuid(),
        title: thread.title().as_str().to_string(),
        body: thread.body().as_str().to_string(),
        category: thread.category().label().to_string(),
        category_slug: thread.category().slug().to_string(),
        author_name: thread.author().display_name().as_str().to_string(),
        tags: thread.tags().as_slice().to_vec(),
        attached_asset: thread.attached_asset().map(|a| AttachedAssetData {
            creature_id: a.creature_id.to_uuid(),
            nickname: a.nickname.clone(),
            species: a.species.clone(),
            school: a.school.clone(),
        }),
        reply_count: thread.reply_count(),
        last_reply_at: timestamp(thread.last_reply_at()),
        last_reply_author_name: thread.last_reply_author_name().map(str::to_string),
        is_pinned: thread.is_pinned(),
        is_locked: thread.is_locked(),
        created_at: timestamp(thread.created_at()),
    }
}

fn post_data(post: &Post) -> PostData {
    PostData {
        id: post.id().to_uuid(),
        author_name: post.author().display_name().as_str().to_string(),
        body: post.body().as_str().to_string(),
        created_at: timestamp(post.created_at()),
    }
}

fn draft_view(editor: &DraftEditor) -> DraftView {
    DraftView {
        key: editor.key().to_string(),
        baseline: *editor.baseline(),
        effective: *editor.effective(),
        potentials: editor.potentials(),
        total: editor.effective().total(),
        status: editor.status(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn health() -> ApiResult<Health> {
    ok(Health {
        status: "ok".to_string(),
    })
}

async fn compute_potentials(
    State(app): State<Arc<App>>,
    ApiJson(req): ApiJson<PotentialsRequest>,
) -> ApiResult<PotentialsResponse> {
    let report = app.use_cases.calculator.execute(&req.attributes);
    ok(PotentialsResponse {
        potentials: report.potentials,
        maximum: report.maximum,
        total: report.total,
    })
}

async fn my_creatures(State(app): State<Arc<App>>, Caller(ctx): Caller) -> ApiResult<CreatureList> {
    let creatures = app.use_cases.creatures.mine.execute(&ctx).await?;
    ok(CreatureList {
        creatures: creatures.iter().map(creature_data).collect(),
    })
}

async fn save_creature(
    State(app): State<Arc<App>>,
    Caller(ctx): Caller,
    ApiJson(req): ApiJson<SaveCreatureRequest>,
) -> ApiResult<SavedCreature> {
    let input = SaveCreatureInput {
        id: req.id.map(CreatureId::from_uuid),
        nickname: req.nickname,
        species: req.species,
        school: req.school,
        age: req.age,
        attributes: req.attributes,
        max_attributes: req.max_attributes,
        talents: req.talents,
    };
    let id = app.use_cases.creatures.save.execute(&ctx, input).await?;
    ok(SavedCreature { id: id.to_uuid() })
}

async fn get_creature(
    State(app): State<Arc<App>>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> ApiResult<CreatureData> {
    let id = CreatureId::from_uuid(parse_uuid(&id, "creature")?);
    let creature = app.use_cases.creatures.get.execute(&ctx, id).await?;
    ok(creature_data(&creature))
}

async fn list_creature(
    State(app): State<Arc<App>>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Ack> {
    let id = CreatureId::from_uuid(parse_uuid(&id, "creature")?);
    let req: ListCreatureRequest = optional_body(&body)?;
    let input = ListCreatureInput {
        currency: req.currency,
        amount: req.amount,
    };
    app.use_cases.listings.list.execute(&ctx, id, input).await?;
    ok(Ack::ok())
}

async fn unlist_creature(
    State(app): State<Arc<App>>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> ApiResult<Ack> {
    let id = CreatureId::from_uuid(parse_uuid(&id, "creature")?);
    app.use_cases.listings.unlist.execute(&ctx, id).await?;
    ok(Ack::ok())
}

async fn release_creature(
    State(app): State<Arc<App>>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> ApiResult<Ack> {
    let id = CreatureId::from_uuid(parse_uuid(&id, "creature")?);
    app.use_cases.creatures.release.execute(&ctx, id).await?;
    ok(Ack::ok())
}

async fn marketplace(
    State(app): State<Arc<App>>,
    ApiQuery(query): ApiQuery<MarketplaceQuery>,
) -> ApiResult<ListingList> {
    let listings = app.use_cases.listings.marketplace.execute(query.limit).await?;
    ok(ListingList {
        listings: listings.iter().map(listing_data).collect(),
    })
}

async fn list_threads(
    State(app): State<Arc<App>>,
    ApiQuery(query): ApiQuery<ThreadListQuery>,
) -> ApiResult<ThreadList> {
    let threads = app
        .use_cases
        .board
        .list_threads
        .execute(query.category.as_deref(), query.limit)
        .await?;
    ok(ThreadList {
        threads: threads.iter().map(thread_data).collect(),
    })
}

async fn create_thread(
    State(app): State<Arc<App>>,
    Caller(ctx): Caller,
    ApiJson(req): ApiJson<CreateThreadRequest>,
) -> ApiResult<CreatedThread> {
    let input = CreateThreadInput {
        title: req.title,
        body: req.body,
        category: req.category,
        tags: req.tags,
        persona_name: req.persona_name,
        attached_creature_id: req.attached_creature_id.map(CreatureId::from_uuid),
    };
    let thread_id = app.use_cases.board.create_thread.execute(&ctx, input).await?;
    ok(CreatedThread {
        thread_id: thread_id.to_uuid(),
    })
}

async fn get_thread(State(app): State<Arc<App>>, Path(id): Path<String>) -> ApiResult<ThreadDetail> {
    let id = ThreadId::from_uuid(parse_uuid(&id, "thread")?);
    let (thread, posts) = app.use_cases.board.get_thread.execute(id).await?;
    ok(ThreadDetail {
        thread: thread_data(&thread),
        posts: posts.iter().map(post_data).collect(),
    })
}

async fn post_reply(
    State(app): State<Arc<App>>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<PostReplyRequest>,
) -> ApiResult<Ack> {
    let id = ThreadId::from_uuid(parse_uuid(&id, "thread")?);
    let input = PostReplyInput {
        body: req.body,
        persona_name: req.persona_name,
    };
    app.use_cases.board.post_reply.execute(&ctx, id, input).await?;
    ok(Ack::ok())
}

async fn open_draft(
    State(app): State<Arc<App>>,
    Caller(ctx): Caller,
    Path(key): Path<String>,
) -> ApiResult<DraftView> {
    let key = parse_draft_key(&key)?;
    let editor = app.use_cases.workbench.open(&ctx, key).await?;
    ok(draft_view(&editor))
}

async fn update_draft(
    State(app): State<Arc<App>>,
    Caller(ctx): Caller,
    Path(key): Path<String>,
    ApiJson(req): ApiJson<UpdateDraftRequest>,
) -> ApiResult<DraftView> {
    let key = parse_draft_key(&key)?;
    let editor = app
        .use_cases
        .workbench
        .update(&ctx, key, req.attributes)
        .await?;
    ok(draft_view(&editor))
}

async fn discard_draft(
    State(app): State<Arc<App>>,
    Caller(ctx): Caller,
    Path(key): Path<String>,
) -> ApiResult<DraftView> {
    let key = parse_draft_key(&key)?;
    let editor = app.use_cases.workbench.discard(&ctx, key).await?;
    ok(draft_view(&editor))
}

async fn commit_draft(
    State(app): State<Arc<App>>,
    Caller(ctx): Caller,
    Path(key): Path<String>,
    body: Bytes,
) -> ApiResult<CommittedDraft> {
    let key = parse_draft_key(&key)?;
    let req: CommitDraftRequest = optional_body(&body)?;
    let details = CommitDetails {
        nickname: req.nickname,
        species: req.species,
        school: req.school,
        age: req.age,
        max_attributes: req.max_attributes,
        talents: req.talents,
    };
    let (id, editor) = app.use_cases.workbench.commit(&ctx, key, details).await?;
    ok(CommittedDraft {
        id: id.to_uuid(),
        draft: draft_view(&editor),
    })
}
