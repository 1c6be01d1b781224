//! Campaign repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Campaign, UrgencyLevel};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

/// Campaign repository trait
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn create(&self, campaign: &Campaign) -> Result<Campaign>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Campaign>>;

    /// One page of campaigns, most urgent first then newest first.
    ///
    /// Returns the page and the total number of campaigns.
    async fn list(&self, page: i64, per_page: i64) -> Result<(Vec<Campaign>, i64)>;

    /// Campaigns of one urgency level, newest first
    async fn list_by_urgency(&self, level: UrgencyLevel) -> Result<Vec<Campaign>>;

    /// Campaigns created by a user, newest first
    async fn list_by_creator(&self, creator_id: i64) -> Result<Vec<Campaign>>;
}

/// SQLx-based campaign repository implementation
pub struct SqlxCampaignRepository {
    pool: DynDatabasePool,
}

impl SqlxCampaignRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CampaignRepository> {
        Arc::new(Self::new(pool))
    }
}

const CAMPAIGN_COLUMNS: &str = "id, creator_id, title, body, image, urgency_level, created_at";

const URGENCY_ORDER: &str = r#"
    CASE urgency_level WHEN 'urgent' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END,
    created_at DESC, id DESC
"#;

const INSERT_CAMPAIGN: &str = r#"
    INSERT INTO campaigns (creator_id, title, body, image, urgency_level, created_at)
    VALUES (?, ?, ?, ?, ?, ?)
"#;

fn parse_urgency(raw: &str) -> Result<UrgencyLevel> {
    UrgencyLevel::from_str(raw).with_context(|| format!("Invalid urgency level in database: {}", raw))
}

fn row_to_campaign_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Campaign> {
    let urgency: String = row.try_get("urgency_level")?;
    Ok(Campaign {
        id: row.try_get("id")?,
        creator_id: row.try_get("creator_id")?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        image: row.try_get("image")?,
        urgency_level: parse_urgency(&urgency)?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_campaign_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Campaign> {
    let urgency: String = row.try_get("urgency_level")?;
    Ok(Campaign {
        id: row.try_get("id")?,
        creator_id: row.try_get("creator_id")?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        image: row.try_get("image")?,
        urgency_level: parse_urgency(&urgency)?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl CampaignRepository for SqlxCampaignRepository {
    async fn create(&self, campaign: &Campaign) -> Result<Campaign> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(INSERT_CAMPAIGN)
                    .bind(campaign.creator_id)
                    .bind(&campaign.title)
                    .bind(&campaign.body)
                    .bind(&campaign.image)
                    .bind(campaign.urgency_level.as_str())
                    .bind(campaign.created_at)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to create campaign")?
                    .last_insert_rowid()
            }
            DatabaseDriver::Mysql => {
                sqlx::query(INSERT_CAMPAIGN)
                    .bind(campaign.creator_id)
                    .bind(&campaign.title)
                    .bind(&campaign.body)
                    .bind(&campaign.image)
                    .bind(campaign.urgency_level.as_str())
                    .bind(campaign.created_at)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to create campaign")?
                    .last_insert_id() as i64
            }
        };

        Ok(Campaign {
            id,
            ..campaign.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Campaign>> {
        let sql = format!("SELECT {} FROM campaigns WHERE id = ?", CAMPAIGN_COLUMNS);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to get campaign by ID")?;
                row.as_ref().map(row_to_campaign_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to get campaign by ID")?;
                row.as_ref().map(row_to_campaign_mysql).transpose()
            }
        }
    }

    async fn list(&self, page: i64, per_page: i64) -> Result<(Vec<Campaign>, i64)> {
        let offset = (page - 1).max(0) * per_page;
        let sql = format!(
            "SELECT {} FROM campaigns ORDER BY {} LIMIT ? OFFSET ?",
            CAMPAIGN_COLUMNS, URGENCY_ORDER
        );
        let count_sql = "SELECT COUNT(*) AS count FROM campaigns";

        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let pool = self.pool.as_sqlite().unwrap();
                let rows = sqlx::query(&sql)
                    .bind(per_page)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
                    .context("Failed to list campaigns")?;
                let total: i64 = sqlx::query(count_sql)
                    .fetch_one(pool)
                    .await
                    .context("Failed to count campaigns")?
                    .try_get("count")?;
                let campaigns = rows.iter().map(row_to_campaign_sqlite).collect::<Result<_>>()?;
                Ok((campaigns, total))
            }
            DatabaseDriver::Mysql => {
                let pool = self.pool.as_mysql().unwrap();
                let rows = sqlx::query(&sql)
                    .bind(per_page)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
                    .context("Failed to list campaigns")?;
                let total: i64 = sqlx::query(count_sql)
                    .fetch_one(pool)
                    .await
                    .context("Failed to count campaigns")?
                    .try_get("count")?;
                let campaigns = rows.iter().map(row_to_campaign_mysql).collect::<Result<_>>()?;
                Ok((campaigns, total))
            }
        }
    }

    async fn list_by_urgency(&self, level: UrgencyLevel) -> Result<Vec<Campaign>> {
        let sql = format!(
            "SELECT {} FROM campaigns WHERE urgency_level = ? ORDER BY created_at DESC, id DESC",
            CAMPAIGN_COLUMNS
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .bind(level.as_str())
                    .fetch_all(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to list campaigns by urgency")?;
                rows.iter().map(row_to_campaign_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .bind(level.as_str())
                    .fetch_all(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to list campaigns by urgency")?;
                rows.iter().map(row_to_campaign_mysql).collect()
            }
        }
    }

    async fn list_by_creator(&self, creator_id: i64) -> Result<Vec<Campaign>> {
        let sql = format!(
            "SELECT {} FROM campaigns WHERE creator_id = ? ORDER BY created_at DESC, id DESC",
            CAMPAIGN_COLUMNS
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .bind(creator_id)
                    .fetch_all(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to list campaigns by creator")?;
                rows.iter().map(row_to_campaign_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .bind(creator_id)
                    .fetch_all(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to list campaigns by creator")?;
                rows.iter().map(row_to_campaign_mysql).collect()
            }
        }
    }
}
