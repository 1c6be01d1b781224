//! Catalogue API endpoints
//!
//! - GET/POST /api/v1/locations - Event locations
//! - GET/POST /api/v1/skills - Skills users can list on their profile
//! - GET/POST /api/v1/interests - Interests, also used as event categories

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::common::AppJson;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{CatalogEntry, CatalogKind, CreateCatalogEntryInput};

#[derive(Debug, Serialize)]
pub struct CatalogListResponse {
    pub items: Vec<CatalogEntry>,
}

/// Build the router for one catalogue
pub fn router(kind: CatalogKind) -> Router<AppState> {
    Router::new().route(
        "/",
        get(move |state: State<AppState>| list_entries(state, kind)).post(
            move |state: State<AppState>, body: AppJson<CreateCatalogEntryInput>| {
                create_entry(state, body, kind)
            },
        ),
    )
}

async fn list_entries(
    State(state): State<AppState>,
    kind: CatalogKind,
) -> Result<Json<CatalogListResponse>, ApiError> {
    let items = state.catalog_service.list(kind).await?;

    Ok(Json(CatalogListResponse { items }))
}

async fn create_entry(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCatalogEntryInput>,
    kind: CatalogKind,
) -> Result<(StatusCode, Json<CatalogEntry>), ApiError> {
    let entry = state.catalog_service.create(kind, &input.name).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}
