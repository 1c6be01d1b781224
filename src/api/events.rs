//! Event API endpoints
//!
//! - GET /api/v1/events?is_available=&location=&category= - List events
//! - POST /api/v1/events - Create an event
//! - POST /api/v1/events/register - Register a user for an event

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::common::{AppJson, AppQuery};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateEventInput, Event, EventFilter, EventRegistration};

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<Event>,
}

/// Registration body. Both ids are optional here so a missing one gets a
/// descriptive 400 instead of a generic body rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub event_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub registration: EventRegistration,
}

/// Build the events router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/register", post(register_for_event))
}

/// GET /api/v1/events?is_available=&location=&category=
async fn list_events(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<EventFilter>,
) -> Result<Json<EventListResponse>, ApiError> {
    let events = state.event_service.list(filter).await?;

    Ok(Json(EventListResponse { events }))
}

/// POST /api/v1/events
async fn create_event(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateEventInput>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.event_service.create_event(input).await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// POST /api/v1/events/register
async fn register_for_event(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let (Some(user_id), Some(event_id)) = (body.user_id, body.event_id) else {
        return Err(ApiError::validation_error("User ID and Event ID are required"));
    };

    let registration = state.event_service.register(user_id, event_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Successfully Registered For This Event".to_string(),
            registration,
        }),
    ))
}
