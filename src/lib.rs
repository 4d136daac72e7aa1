pub mod config;
pub mod error;
pub mod state;
pub mod auth;
pub mod db;
pub mod models;
pub mod accounts;
pub mod recipe;
pub mod media;
pub mod upload;
pub mod rate_limit;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use sqlx::PgPool;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::media::LocalStorage;
use crate::rate_limit::LoginRateLimiter;
use crate::state::{AppState, SharedState};

pub fn build_state(pool: PgPool, config: Config) -> SharedState {
    let media = Arc::new(LocalStorage::new(config.media_root.clone()));

    Arc::new(AppState {
        pool,
        config,
        media,
        login_limiter: LoginRateLimiter::new(),
    })
}

pub fn build_app(state: SharedState) -> Router {
    let media_root = state.config.media_root.clone();

    Router::new()
        .merge(routes::api_routes(state.config.max_upload_size))
        .nest_service("/media", ServeDir::new(media_root))
        .route("/health", axum::routing::get(health))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
