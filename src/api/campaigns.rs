//! Campaign API endpoints
//!
//! - GET /api/v1/campaigns - Paginated, urgency-ordered list
//! - POST /api/v1/campaigns - Create a campaign
//! - GET /api/v1/campaigns/urgent - Urgent campaigns
//! - GET /api/v1/campaigns/{id} - Campaign detail
//! - GET /api/v1/campaigns/{id}/aggregate - Progress figures

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::common::{AppJson, AppQuery, PaginationQuery};
use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{CampaignListResponse, PaginatedCampaignsResponse};
use crate::models::{Campaign, CampaignAggregate, CreateCampaignInput};

#[derive(Debug, Serialize)]
pub struct CreateCampaignResponse {
    pub message: String,
    pub campaign: Campaign,
}

/// Build the campaigns router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_campaigns).post(create_campaign))
        .route("/urgent", get(list_urgent_campaigns))
        .route("/{id}", get(get_campaign))
        .route("/{id}/aggregate", get(get_campaign_aggregate))
}

/// GET /api/v1/campaigns?page=&page_size=
async fn list_campaigns(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PaginationQuery>,
) -> Result<Json<PaginatedCampaignsResponse>, ApiError> {
    let result = state.campaign_service.list(query.into()).await?;

    Ok(Json(result.into()))
}

/// POST /api/v1/campaigns
async fn create_campaign(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCampaignInput>,
) -> Result<(StatusCode, Json<CreateCampaignResponse>), ApiError> {
    let campaign = state.campaign_service.create(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCampaignResponse {
            message: "Campaign created successfully".to_string(),
            campaign,
        }),
    ))
}

/// GET /api/v1/campaigns/urgent
async fn list_urgent_campaigns(
    State(state): State<AppState>,
) -> Result<Json<CampaignListResponse>, ApiError> {
    let campaigns = state.campaign_service.list_urgent().await?;

    Ok(Json(CampaignListResponse { campaigns }))
}

/// GET /api/v1/campaigns/{id}
async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Campaign>, ApiError> {
    Ok(Json(state.campaign_service.get(id).await?))
}

/// GET /api/v1/campaigns/{id}/aggregate
async fn get_campaign_aggregate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CampaignAggregate>, ApiError> {
    Ok(Json(state.campaign_service.aggregate(id).await?))
}
