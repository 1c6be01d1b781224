//! Shared API response types

use serde::Serialize;

use crate::models::{Campaign, PagedResult, Session};

/// Session list response
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<Session>,
}

/// Campaign list response without paging
#[derive(Debug, Serialize)]
pub struct CampaignListResponse {
    pub campaigns: Vec<Campaign>,
}

/// Paginated campaign list response
#[derive(Debug, Serialize)]
pub struct PaginatedCampaignsResponse {
    pub campaigns: Vec<Campaign>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl From<PagedResult<Campaign>> for PaginatedCampaignsResponse {
    fn from(result: PagedResult<Campaign>) -> Self {
        let total_pages = result.total_pages();
        Self {
            campaigns: result.items,
            total: result.total,
            page: result.page,
            page_size: result.per_page,
            total_pages,
        }
    }
}
