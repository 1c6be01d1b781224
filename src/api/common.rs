//! Common API utilities and shared types

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use serde::Deserialize;

use crate::api::middleware::ApiError;
use crate::models::ListParams;

/// JSON body extractor whose rejections render as `ApiError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Query string extractor whose rejections render as `ApiError`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

/// Pagination query parameters
///
/// Missing values fall back to page 1 and the default page size.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl From<PaginationQuery> for ListParams {
    fn from(query: PaginationQuery) -> Self {
        ListParams::new(query.page, query.page_size)
    }
}
