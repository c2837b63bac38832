//! Familiar Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::HeaderName;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use familiar_engine::api::{self, identity};
use familiar_engine::app::{App, Repositories};
use familiar_engine::infrastructure::{
    clock::SystemClock, config::EngineConfig, draft_cache::InMemoryDraftCache, ports::ClockPort,
    sqlite::SqliteStore,
};

/// How often expired drafts are swept from the cache.
const DRAFT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "familiar_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Familiar Engine");

    let config = EngineConfig::from_env();
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    let store = Arc::new(SqliteStore::open(&config.database_path, clock.clone()).await?);
    let drafts = Arc::new(InMemoryDraftCache::new(config.draft_ttl));
    tracing::info!(ttl_secs = config.draft_ttl.as_secs(), "Draft cache ready");

    let app = Arc::new(App::new(
        Repositories::sqlite(store, drafts.clone()),
        clock,
    ));

    // Spawn draft cache sweeper
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(DRAFT_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = drafts.cleanup_expired();
            if removed > 0 {
                tracing::info!(removed, remaining = drafts.len(), "Swept expired drafts");
            }
        }
    });

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    let addr: SocketAddr = config.bind_address().parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        // Identity headers and JSON bodies both trigger preflights.
        .allow_headers([
            HeaderName::from_static(identity::USER_ID_HEADER),
            HeaderName::from_static(identity::USER_NAME_HEADER),
            HeaderName::from_static(identity::USER_EMAIL_HEADER),
            axum::http::header::CONTENT_TYPE,
        ]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
