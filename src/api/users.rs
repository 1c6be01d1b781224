//! User API endpoints
//!
//! - POST /api/v1/users - Create a user
//! - GET /api/v1/users/{id} - User detail including points
//! - GET /api/v1/users/{id}/sessions - Volunteer history
//! - GET /api/v1/users/{id}/campaigns - Campaigns created by the user
//! - GET /api/v1/users/{id}/certificate - Certificate eligibility
//! - GET /api/v1/users/{id}/profile - Profile with skills and interests
//! - PUT /api/v1/users/{id}/profile - Partial profile update

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::common::AppJson;
use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{CampaignListResponse, SessionListResponse};
use crate::models::{Certificate, CreateUserInput, Profile, UpdateProfileInput, User};

/// Build the users router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/{id}", get(get_user))
        .route("/{id}/sessions", get(get_user_sessions))
        .route("/{id}/campaigns", get(get_user_campaigns))
        .route("/{id}/certificate", get(get_user_certificate))
        .route("/{id}/profile", get(get_user_profile).put(update_user_profile))
}

/// POST /api/v1/users
async fn create_user(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateUserInput>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.user_service.create_user(input).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users/{id}
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.user_service.get(id).await?))
}

/// GET /api/v1/users/{id}/sessions
async fn get_user_sessions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let sessions = state.user_service.history(id).await?;

    Ok(Json(SessionListResponse { sessions }))
}

/// GET /api/v1/users/{id}/campaigns
async fn get_user_campaigns(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CampaignListResponse>, ApiError> {
    let campaigns = state.campaign_service.list_by_creator(id).await?;

    Ok(Json(CampaignListResponse { campaigns }))
}

/// GET /api/v1/users/{id}/certificate
async fn get_user_certificate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Certificate>, ApiError> {
    Ok(Json(state.user_service.certificate(id).await?))
}

/// GET /api/v1/users/{id}/profile
async fn get_user_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(state.user_service.profile(id).await?))
}

/// PUT /api/v1/users/{id}/profile
async fn update_user_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(input): AppJson<UpdateProfileInput>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(state.user_service.update_profile(id, input).await?))
}
