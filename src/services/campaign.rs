//! Campaign service
//!
//! Campaign catalogue and progress aggregation:
//! - Create campaigns for existing users
//! - Urgency-ordered paginated listing (cached)
//! - Urgent campaigns and per-creator listings
//! - Aggregated session figures, always computed fresh

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::{CampaignRepository, SessionRepository, UserRepository};
use crate::models::{
    Campaign, CampaignAggregate, CreateCampaignInput, ListParams, PagedResult, UrgencyLevel,
};
use crate::services::aggregate::aggregate;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Cache key prefixes
const CACHE_KEY_CAMPAIGN_LIST: &str = "campaigns:list:";
const CACHE_KEY_CAMPAIGN_URGENT: &str = "campaigns:urgent";
const CACHE_PATTERN_CAMPAIGNS: &str = "campaigns:*";

/// Error types for campaign service operations
#[derive(Debug, thiserror::Error)]
pub enum CampaignServiceError {
    /// Campaign not found
    #[error("Campaign not found: {0}")]
    NotFound(i64),

    /// Creator (or listed user) not found
    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Campaign service
pub struct CampaignService {
    campaign_repo: Arc<dyn CampaignRepository>,
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    cache: Arc<Cache>,
    cache_ttl: Duration,
}

impl CampaignService {
    pub fn new(
        campaign_repo: Arc<dyn CampaignRepository>,
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        cache: Arc<Cache>,
    ) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            campaign_repo,
            user_repo,
            session_repo,
            cache,
            cache_ttl,
        }
    }

    /// Create a campaign.
    ///
    /// A missing urgency level means `Low`.
    ///
    /// # Errors
    /// - `ValidationError` for a blank title or body, or an unknown urgency
    /// - `UserNotFound` if the creator does not exist
    pub async fn create(&self, input: CreateCampaignInput) -> Result<Campaign, CampaignServiceError> {
        let urgency = validate_create_input(&input)?;

        self.user_repo
            .get_by_id(input.creator_id)
            .await?
            .ok_or(CampaignServiceError::UserNotFound(input.creator_id))?;

        let image = input.image.filter(|url| !url.trim().is_empty());
        let campaign = Campaign::new(
            input.creator_id,
            input.title.trim().to_string(),
            input.body,
            image,
            urgency,
        );
        let created = self
            .campaign_repo
            .create(&campaign)
            .await
            .context("Failed to create campaign")?;

        tracing::info!(
            campaign_id = created.id,
            creator_id = created.creator_id,
            urgency = %created.urgency_level,
            "Campaign created"
        );
        let _ = self.cache.delete_pattern(CACHE_PATTERN_CAMPAIGNS).await;

        Ok(created)
    }

    /// One page of campaigns, most urgent first, newest first within a level.
    pub async fn list(&self, params: ListParams) -> Result<PagedResult<Campaign>, CampaignServiceError> {
        let cache_key = format!("{}{}:{}", CACHE_KEY_CAMPAIGN_LIST, params.page, params.per_page);

        if let Some(page) = self
            .cache
            .get::<PagedResult<Campaign>>(&cache_key)
            .await
            .ok()
            .flatten()
        {
            return Ok(page);
        }

        let (items, total) = self
            .campaign_repo
            .list(params.page as i64, params.per_page as i64)
            .await
            .context("Failed to list campaigns")?;
        let page = PagedResult::new(items, total, &params);

        let _ = self.cache.set(&cache_key, &page, self.cache_ttl).await;

        Ok(page)
    }

    /// Campaigns marked `Urgent`, newest first.
    pub async fn list_urgent(&self) -> Result<Vec<Campaign>, CampaignServiceError> {
        if let Some(campaigns) = self
            .cache
            .get::<Vec<Campaign>>(CACHE_KEY_CAMPAIGN_URGENT)
            .await
            .ok()
            .flatten()
        {
            return Ok(campaigns);
        }

        let campaigns = self
            .campaign_repo
            .list_by_urgency(UrgencyLevel::Urgent)
            .await
            .context("Failed to list urgent campaigns")?;

        let _ = self
            .cache
            .set(CACHE_KEY_CAMPAIGN_URGENT, &campaigns, self.cache_ttl)
            .await;

        Ok(campaigns)
    }

    pub async fn get(&self, id: i64) -> Result<Campaign, CampaignServiceError> {
        self.campaign_repo
            .get_by_id(id)
            .await?
            .ok_or(CampaignServiceError::NotFound(id))
    }

    /// Campaigns created by a user, newest first.
    pub async fn list_by_creator(&self, user_id: i64) -> Result<Vec<Campaign>, CampaignServiceError> {
        self.user_repo
            .get_by_id(user_id)
            .await?
            .ok_or(CampaignServiceError::UserNotFound(user_id))?;

        Ok(self
            .campaign_repo
            .list_by_creator(user_id)
            .await
            .context("Failed to list campaigns by creator")?)
    }

    pub async fn aggregate(&self, id: i64) -> Result<CampaignAggregate, CampaignServiceError> {
        self.aggregate_at(id, Utc::now()).await
    }

    /// Aggregate figures for a campaign as of `now`. Never cached.
    pub async fn aggregate_at(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<CampaignAggregate, CampaignServiceError> {
        let campaign = self.get(id).await?;
        let sessions = self
            .session_repo
            .list_by_campaign(id)
            .await
            .context("Failed to load campaign sessions")?;

        Ok(aggregate(&campaign, &sessions, now))
    }
}

fn validate_create_input(input: &CreateCampaignInput) -> Result<UrgencyLevel, CampaignServiceError> {
    if input.title.trim().is_empty() {
        return Err(CampaignServiceError::ValidationError(
            "Campaign title cannot be empty".to_string(),
        ));
    }
    if input.body.trim().is_empty() {
        return Err(CampaignServiceError::ValidationError(
            "Campaign body cannot be empty".to_string(),
        ));
    }
    match input.urgency_level.as_deref().map(str::trim) {
        None | Some("") => Ok(UrgencyLevel::default()),
        Some(raw) => UrgencyLevel::from_str(raw)
            .map_err(|e| CampaignServiceError::ValidationError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::db::repositories::{SqlxCampaignRepository, SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::SessionStatus;
    use crate::services::SessionService;
    use chrono::{Duration as ChronoDuration, TimeZone};

    async fn setup_test_service() -> (DynDatabasePool, CampaignService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        pool.execute(
            "INSERT INTO users (id, username, email, full_name) VALUES (1, 'ana', 'ana@example.com', 'Ana'), (2, 'bo', 'bo@example.com', 'Bo')",
        )
        .await
        .unwrap();
        let service = CampaignService::new(
            SqlxCampaignRepository::boxed(pool.clone()),
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            Arc::new(MemoryCache::new()),
        );
        (pool, service)
    }

    fn input(creator_id: i64, title: &str, urgency: Option<&str>) -> CreateCampaignInput {
        CreateCampaignInput {
            creator_id,
            title: title.to_string(),
            body: "We need hands".to_string(),
            image: None,
            urgency_level: urgency.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_campaign() {
        let (_pool, service) = setup_test_service().await;

        let created = service
            .create(input(1, "  Flood relief ", Some("urgent")))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.title, "Flood relief");
        assert_eq!(created.urgency_level, UrgencyLevel::Urgent);
        assert_eq!(service.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_defaults_to_low_urgency() {
        let (_pool, service) = setup_test_service().await;

        let created = service.create(input(1, "Park cleanup", None)).await.unwrap();

        assert_eq!(created.urgency_level, UrgencyLevel::Low);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let (_pool, service) = setup_test_service().await;

        let blank_title = service.create(input(1, "  ", None)).await;
        let bad_urgency = service.create(input(1, "Shelter", Some("critical"))).await;
        let mut no_body = input(1, "Shelter", None);
        no_body.body = String::new();
        let no_body = service.create(no_body).await;
        let no_creator = service.create(input(42, "Shelter", None)).await;

        assert!(matches!(blank_title, Err(CampaignServiceError::ValidationError(_))));
        assert!(matches!(bad_urgency, Err(CampaignServiceError::ValidationError(_))));
        assert!(matches!(no_body, Err(CampaignServiceError::ValidationError(_))));
        assert!(matches!(no_creator, Err(CampaignServiceError::UserNotFound(42))));
    }

    #[tokio::test]
    async fn test_get_missing_campaign() {
        let (_pool, service) = setup_test_service().await;

        assert!(matches!(service.get(7).await, Err(CampaignServiceError::NotFound(7))));
        assert!(matches!(
            service.aggregate(7).await,
            Err(CampaignServiceError::NotFound(7))
        ));
    }

    #[tokio::test]
    async fn test_list_orders_and_invalidates_on_create() {
        let (_pool, service) = setup_test_service().await;
        service.create(input(1, "low", Some("low"))).await.unwrap();
        service.create(input(1, "urgent", Some("urgent"))).await.unwrap();

        let first = service.list(ListParams::default()).await.unwrap();
        assert_eq!(first.total, 2);
        assert_eq!(first.items[0].title, "urgent");
        assert!(service.list_urgent().await.unwrap().len() == 1);

        service.create(input(2, "medium", Some("medium"))).await.unwrap();
        service.create(input(2, "urgent again", Some("Urgent"))).await.unwrap();

        let titles: Vec<_> = service
            .list(ListParams::default())
            .await
            .unwrap()
            .items
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["urgent again", "urgent", "medium", "low"]);
        assert_eq!(service.list_urgent().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_pages() {
        let (_pool, service) = setup_test_service().await;
        for i in 0..5 {
            service.create(input(1, &format!("c{}", i), None)).await.unwrap();
        }

        let page = service.list(ListParams::new(Some(2), Some(2))).await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_list_by_creator() {
        let (_pool, service) = setup_test_service().await;
        service.create(input(1, "mine", None)).await.unwrap();
        service.create(input(2, "theirs", None)).await.unwrap();

        let mine = service.list_by_creator(1).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "mine");
        assert!(matches!(
            service.list_by_creator(9).await,
            Err(CampaignServiceError::UserNotFound(9))
        ));
    }

    #[tokio::test]
    async fn test_aggregate_reflects_session_ledger() {
        let (pool, service) = setup_test_service().await;
        let campaign = service.create(input(1, "Soup kitchen", None)).await.unwrap();
        let sessions = SessionService::new(
            SqlxSessionRepository::boxed(pool.clone()),
            SqlxUserRepository::boxed(pool.clone()),
            SqlxCampaignRepository::boxed(pool.clone()),
            Arc::new(MemoryCache::new()),
        );

        let t0 = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();
        sessions
            .transition_at(1, campaign.id, SessionStatus::Started, t0)
            .await
            .unwrap();
        sessions
            .transition_at(1, campaign.id, SessionStatus::Stopped, t0 + ChronoDuration::hours(1))
            .await
            .unwrap();
        sessions
            .transition_at(2, campaign.id, SessionStatus::Started, t0)
            .await
            .unwrap();

        let now = t0 + ChronoDuration::hours(2);
        let figures = service.aggregate_at(campaign.id, now).await.unwrap();

        assert_eq!(figures.total_sessions, 2);
        assert_eq!(figures.total_volunteered_hours, 3);
        assert_eq!(figures.age_hours, (now - campaign.created_at).num_hours());
    }
}
