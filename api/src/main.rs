//! Labelfeed API Server
//!
//! Watches GitHub issues carrying a set of labels and publishes new issues
//! and new comments as RSS, Atom and JSON feeds behind opaque tokens.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod error;
mod feed;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::GitHubClientImpl;
use app::{spawn_scheduler, FeedRegistry, FeedService, FeedTokenCodec, ScanPolicy, ScannerService};
use config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub feed_service: Arc<FeedService<GitHubClientImpl>>,
    pub config: Config,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    feeds: usize,
    scan_interval_secs: u64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        feeds: state.feed_service.registry().len(),
        scan_interval_secs: state.config.scan_interval.as_secs(),
    })
}

/// Build the HTTP router
pub fn router(state: AppState) -> anyhow::Result<Router> {
    // Registration hits GitHub: 1 req/sec sustained, burst of 5 per peer IP
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(1)
            .burst_size(5)
            .finish()
            .context("Failed to build governor config")?,
    );

    let rate_limited_routes = Router::new()
        .route("/feeds", post(handlers::register_feed))
        .layer(GovernorLayer {
            config: governor_config,
        });

    Ok(Router::new()
        .route("/health", get(health))
        .route("/rss/:token", get(handlers::get_rss))
        .route("/atom/:token", get(handlers::get_atom))
        .route("/json/:token", get(handlers::get_json))
        .merge(rate_limited_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,labelfeed_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Labelfeed API...");

    let config = Config::from_env().context("Failed to load configuration")?;

    let github = Arc::new(GitHubClientImpl::new(
        config.github_api_url.clone(),
        config.github_token.clone(),
    ));

    let codec = FeedTokenCodec::new(&config.feed_salt, config.feed_min_length)
        .context("Failed to set up feed tokens")?;
    let registry = Arc::new(FeedRegistry::new(codec));

    let feed_service = Arc::new(FeedService::new(github.clone(), registry.clone()));
    let scanner = Arc::new(ScannerService::new(
        github,
        ScanPolicy {
            per_page: config.per_page,
            include_closed: config.include_closed,
        },
    ));

    // The startup repository must exist; without it there is nothing to serve
    let token = feed_service
        .register_repository(
            &config.default_owner,
            &config.default_repo,
            config.default_labels.clone(),
        )
        .await
        .with_context(|| {
            format!(
                "Failed to register {}/{}",
                config.default_owner, config.default_repo
            )
        })?;

    tracing::info!(
        feed = %token,
        rss = %format!("/rss/{}", token),
        atom = %format!("/atom/{}", token),
        json = %format!("/json/{}", token),
        "Default feed ready"
    );

    spawn_scheduler(scanner, registry, config.scan_interval);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState {
        feed_service,
        config,
    };
    let app = router(state)?;

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

/// State backed by an unreachable GitHub, for handler tests
#[cfg(test)]
pub fn test_state() -> AppState {
    test_state_with_github("http://127.0.0.1:9")
}

/// State whose GitHub client talks to `github_api_url`
#[cfg(test)]
pub fn test_state_with_github(github_api_url: &str) -> AppState {
    let config = Config::from_lookup(|name| match name {
        "RSS_FEED_GITHUB_TOKEN" => Some("test-token".to_string()),
        "RSS_FEED_DEFAULT_ORG" => Some("octo".to_string()),
        "RSS_FEED_DEFAULT_REPO" => Some("repo".to_string()),
        "RSS_FEED_DEFAULT_LABEL" => Some("bug".to_string()),
        "GITHUB_API_URL" => Some(github_api_url.to_string()),
        _ => None,
    })
    .unwrap();

    let github = Arc::new(GitHubClientImpl::new(
        config.github_api_url.clone(),
        config.github_token.clone(),
    ));
    let codec = FeedTokenCodec::new(&config.feed_salt, config.feed_min_length).unwrap();
    let registry = Arc::new(FeedRegistry::new(codec));

    AppState {
        feed_service: Arc::new(FeedService::new(github, registry)),
        config,
    }
}
