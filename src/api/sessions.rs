//! Session API endpoints
//!
//! - POST /api/v1/sessions - Start or stop volunteering on a campaign
//! - GET /api/v1/sessions - List sessions, optionally for one user

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::common::{AppJson, AppQuery};
use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::SessionListResponse;
use crate::models::SessionStatus;
use crate::services::parse_status;

/// Body of a lifecycle request
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub user: i64,
    pub campaign: i64,
    /// `started` or `stopped` (case-insensitive). Kept untyped so a missing
    /// or non-string value is reported like any other bad status.
    #[serde(default)]
    pub status: Option<serde_json::Value>,
}

impl TransitionRequest {
    fn status(&self) -> Result<SessionStatus, ApiError> {
        match self.status.as_ref().and_then(|v| v.as_str()) {
            Some(raw) => Ok(parse_status(raw)?),
            None => Err(ApiError::invalid_argument(
                "status must be 'started' or 'stopped'",
            )),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    pub message: String,
    pub session_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Build the sessions router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_sessions).post(transition))
}

/// POST /api/v1/sessions
async fn transition(
    State(state): State<AppState>,
    AppJson(body): AppJson<TransitionRequest>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let status = body.status()?;

    let view = state
        .session_service
        .transition(body.user, body.campaign, status)
        .await?;

    let message = match status {
        SessionStatus::Started => "Contribution started successfully",
        SessionStatus::Stopped => "Contribution stopped successfully",
    };

    Ok(Json(TransitionResponse {
        message: message.to_string(),
        session_id: view.session.id,
    }))
}

/// GET /api/v1/sessions?user_id=
async fn list_sessions(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListSessionsQuery>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let sessions = state.session_service.list(query.user_id).await?;

    Ok(Json(SessionListResponse { sessions }))
}
