//! API layer - HTTP handlers and routing
//!
//! All endpoints live under `/api/v1`:
//! - Session lifecycle endpoints
//! - Campaign catalogue endpoints
//! - User directory and profile endpoints
//! - Event endpoints
//! - Location, skill and interest catalogues

pub mod campaigns;
pub mod catalogs;
pub mod common;
pub mod events;
pub mod middleware;
pub mod responses;
pub mod sessions;
pub mod users;

use anyhow::Context;
use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::models::CatalogKind;

pub use middleware::{ApiError, AppState};

/// Build the API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/sessions", sessions::router())
        .nest("/campaigns", campaigns::router())
        .nest("/users", users::router())
        .nest("/events", events::router())
        .nest("/locations", catalogs::router(CatalogKind::Location))
        .nest("/skills", catalogs::router(CatalogKind::Skill))
        .nest("/interests", catalogs::router(CatalogKind::Interest))
}

/// Build the complete router with middleware
///
/// `cors_origin` is either a single origin or `*`.
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE]);
    let cors = if cors_origin == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origin = cors_origin
            .parse::<HeaderValue>()
            .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;
        cors.allow_origin(origin)
    };

    Ok(Router::new()
        .nest("/api/v1", build_api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// GET /api/v1/health
async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .pool
        .ping()
        .await
        .map_err(|e| ApiError::internal_error(format!("Database unavailable: {:#}", e)))?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}
