//! Shared request state and error responses
//!
//! Every handler returns `Result<_, ApiError>`; service errors convert into
//! `ApiError` and are rendered as `{ "error": { "code", "message" } }`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::{
    CampaignService, CampaignServiceError, CatalogService, CatalogServiceError, EventService,
    EventServiceError, SessionService, SessionServiceError, UserService, UserServiceError,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: crate::db::DynDatabasePool,
    pub session_service: Arc<SessionService>,
    pub campaign_service: Arc<CampaignService>,
    pub user_service: Arc<UserService>,
    pub event_service: Arc<EventService>,
    pub catalog_service: Arc<CatalogService>,
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::new("INVALID_TRANSITION", message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" | "INVALID_TRANSITION" | "INVALID_ARGUMENT" | "ALREADY_REGISTERED" => {
                StatusCode::BAD_REQUEST
            }
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = %self.error.code, message = %self.error.message, "Request failed");
        }

        (status, Json(self)).into_response()
    }
}

/// Malformed or mistyped request bodies
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation_error(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation_error(rejection.body_text())
    }
}

impl From<SessionServiceError> for ApiError {
    fn from(err: SessionServiceError) -> Self {
        match err {
            SessionServiceError::UserNotFound(_) | SessionServiceError::CampaignNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            SessionServiceError::InvalidTransition(message) => ApiError::invalid_transition(message),
            SessionServiceError::InvalidArgument(message) => ApiError::invalid_argument(message),
            SessionServiceError::StorageConflict { .. } => ApiError::conflict(err.to_string()),
            SessionServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<CampaignServiceError> for ApiError {
    fn from(err: CampaignServiceError) -> Self {
        match err {
            CampaignServiceError::NotFound(_) | CampaignServiceError::UserNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            CampaignServiceError::ValidationError(message) => ApiError::validation_error(message),
            CampaignServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::NotFound(_) => ApiError::not_found(err.to_string()),
            UserServiceError::ValidationError(message) => ApiError::validation_error(message),
            UserServiceError::UserExists(message) => ApiError::conflict(message),
            UserServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<EventServiceError> for ApiError {
    fn from(err: EventServiceError) -> Self {
        match err {
            EventServiceError::NotFound(_) | EventServiceError::UserNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            EventServiceError::AlreadyRegistered => ApiError::new("ALREADY_REGISTERED", err.to_string()),
            EventServiceError::ValidationError(message) => ApiError::validation_error(message),
            EventServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<CatalogServiceError> for ApiError {
    fn from(err: CatalogServiceError) -> Self {
        match err {
            CatalogServiceError::ValidationError(message) => ApiError::validation_error(message),
            CatalogServiceError::AlreadyExists { .. } => ApiError::conflict(err.to_string()),
            CatalogServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}
