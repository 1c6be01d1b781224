//! Session ledger repository
//!
//! Durable volunteering sessions. Two writes matter for correctness:
//!
//! - `start` inserts an open session and relies on the unique guard over
//!   active (user, campaign) pairs; a collision is reported as `Ok(None)`.
//! - `stop` closes a session with a compare-and-set on `status`/`end_at` and
//!   credits the user's points in the same transaction. A lost race is
//!   reported as `Ok(false)` with nothing written.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Session, SessionStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

use super::is_unique_violation;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// The open session of a (user, campaign) pair, if any
    async fn find_active(&self, user_id: i64, campaign_id: i64) -> Result<Option<Session>>;

    /// Open a session starting at `start_at`.
    ///
    /// Returns `None` when the pair already has an open session.
    async fn start(&self, user_id: i64, campaign_id: i64, start_at: DateTime<Utc>) -> Result<Option<Session>>;

    /// Close `session` at `end_at` and credit `points` to its user, atomically.
    ///
    /// Returns `false` when the session was no longer open.
    async fn stop(&self, session: &Session, end_at: DateTime<Utc>, points: i64) -> Result<bool>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Session>>;

    /// All sessions of a campaign, oldest first
    async fn list_by_campaign(&self, campaign_id: i64) -> Result<Vec<Session>>;

    /// All sessions of a user, newest first
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Session>>;

    /// Every session, newest first
    async fn list_all(&self) -> Result<Vec<Session>>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: DynDatabasePool,
}

impl SqlxSessionRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

const SESSION_COLUMNS: &str = "id, user_id, campaign_id, status, start_at, end_at";

const CLOSE_SESSION: &str = r#"
    UPDATE sessions
    SET status = 'stopped', end_at = ?
    WHERE id = ? AND status = 'started' AND end_at IS NULL
"#;

const CREDIT_POINTS: &str = "UPDATE users SET points = points + ? WHERE id = ?";

const INSERT_SESSION: &str = r#"
    INSERT INTO sessions (user_id, campaign_id, status, start_at)
    VALUES (?, ?, 'started', ?)
"#;

fn select_sessions(filter: &str, order: &str) -> String {
    format!(
        "SELECT {} FROM sessions {} ORDER BY {}",
        SESSION_COLUMNS, filter, order
    )
}

const NEWEST_FIRST: &str = "start_at DESC, id DESC";
const OLDEST_FIRST: &str = "start_at ASC, id ASC";

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn find_active(&self, user_id: i64, campaign_id: i64) -> Result<Option<Session>> {
        let sql = select_sessions(
            "WHERE user_id = ? AND campaign_id = ? AND status = 'started' AND end_at IS NULL",
            NEWEST_FIRST,
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(user_id)
                    .bind(campaign_id)
                    .fetch_optional(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to look up active session")?;
                row.as_ref().map(row_to_session_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(user_id)
                    .bind(campaign_id)
                    .fetch_optional(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to look up active session")?;
                row.as_ref().map(row_to_session_mysql).transpose()
            }
        }
    }

    async fn start(&self, user_id: i64, campaign_id: i64, start_at: DateTime<Utc>) -> Result<Option<Session>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                start_session_sqlite(self.pool.as_sqlite().unwrap(), user_id, campaign_id, start_at).await
            }
            DatabaseDriver::Mysql => {
                start_session_mysql(self.pool.as_mysql().unwrap(), user_id, campaign_id, start_at).await
            }
        }
    }

    async fn stop(&self, session: &Session, end_at: DateTime<Utc>, points: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                stop_session_sqlite(self.pool.as_sqlite().unwrap(), session, end_at, points).await
            }
            DatabaseDriver::Mysql => {
                stop_session_mysql(self.pool.as_mysql().unwrap(), session, end_at, points).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Session>> {
        let sql = format!("SELECT {} FROM sessions WHERE id = ?", SESSION_COLUMNS);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to get session by ID")?;
                row.as_ref().map(row_to_session_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to get session by ID")?;
                row.as_ref().map(row_to_session_mysql).transpose()
            }
        }
    }

    async fn list_by_campaign(&self, campaign_id: i64) -> Result<Vec<Session>> {
        let sql = select_sessions("WHERE campaign_id = ?", OLDEST_FIRST);
        self.fetch_sessions(&sql, Some(campaign_id)).await
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Session>> {
        let sql = select_sessions("WHERE user_id = ?", NEWEST_FIRST);
        self.fetch_sessions(&sql, Some(user_id)).await
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        let sql = select_sessions("", NEWEST_FIRST);
        self.fetch_sessions(&sql, None).await
    }
}

impl SqlxSessionRepository {
    async fn fetch_sessions(&self, sql: &str, id: Option<i64>) -> Result<Vec<Session>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let mut query = sqlx::query(sql);
                if let Some(id) = id {
                    query = query.bind(id);
                }
                let rows = query
                    .fetch_all(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to list sessions")?;
                rows.iter().map(row_to_session_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let mut query = sqlx::query(sql);
                if let Some(id) = id {
                    query = query.bind(id);
                }
                let rows = query
                    .fetch_all(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to list sessions")?;
                rows.iter().map(row_to_session_mysql).collect()
            }
        }
    }
}

fn opened(id: i64, user_id: i64, campaign_id: i64, start_at: DateTime<Utc>) -> Session {
    Session {
        id,
        user_id,
        campaign_id,
        status: SessionStatus::Started,
        start_at,
        end_at: None,
    }
}

fn parse_status(raw: &str) -> Result<SessionStatus> {
    SessionStatus::from_str(raw).with_context(|| format!("Invalid session status in database: {}", raw))
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn start_session_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    campaign_id: i64,
    start_at: DateTime<Utc>,
) -> Result<Option<Session>> {
    let result = sqlx::query(INSERT_SESSION)
        .bind(user_id)
        .bind(campaign_id)
        .bind(start_at)
        .execute(pool)
        .await;

    match result {
        Ok(done) => Ok(Some(opened(done.last_insert_rowid(), user_id, campaign_id, start_at))),
        Err(e) if is_unique_violation(&e) => Ok(None),
        Err(e) => Err(e).context("Failed to start session"),
    }
}

async fn stop_session_sqlite(
    pool: &SqlitePool,
    session: &Session,
    end_at: DateTime<Utc>,
    points: i64,
) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let closed = sqlx::query(CLOSE_SESSION)
        .bind(end_at)
        .bind(session.id)
        .execute(&mut *tx)
        .await
        .context("Failed to close session")?;

    if closed.rows_affected() == 0 {
        tx.rollback().await.context("Failed to roll back transaction")?;
        return Ok(false);
    }

    let credited = sqlx::query(CREDIT_POINTS)
        .bind(points)
        .bind(session.user_id)
        .execute(&mut *tx)
        .await
        .context("Failed to credit points")?;

    if credited.rows_affected() == 0 {
        tx.rollback().await.context("Failed to roll back transaction")?;
        anyhow::bail!("User {} disappeared while closing session {}", session.user_id, session.id);
    }

    tx.commit().await.context("Failed to commit session stop")?;
    Ok(true)
}

fn row_to_session_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Session> {
    let status: String = row.try_get("status")?;
    Ok(Session {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        campaign_id: row.try_get("campaign_id")?,
        status: parse_status(&status)?,
        start_at: row.try_get("start_at")?,
        end_at: row.try_get("end_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn start_session_mysql(
    pool: &MySqlPool,
    user_id: i64,
    campaign_id: i64,
    start_at: DateTime<Utc>,
) -> Result<Option<Session>> {
    let result = sqlx::query(INSERT_SESSION)
        .bind(user_id)
        .bind(campaign_id)
        .bind(start_at)
        .execute(pool)
        .await;

    match result {
        Ok(done) => Ok(Some(opened(done.last_insert_id() as i64, user_id, campaign_id, start_at))),
        Err(e) if is_unique_violation(&e) => Ok(None),
        Err(e) => Err(e).context("Failed to start session"),
    }
}

async fn stop_session_mysql(
    pool: &MySqlPool,
    session: &Session,
    end_at: DateTime<Utc>,
    points: i64,
) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let closed = sqlx::query(CLOSE_SESSION)
        .bind(end_at)
        .bind(session.id)
        .execute(&mut *tx)
        .await
        .context("Failed to close session")?;

    if closed.rows_affected() == 0 {
        tx.rollback().await.context("Failed to roll back transaction")?;
        return Ok(false);
    }

    let credited = sqlx::query(CREDIT_POINTS)
        .bind(points)
        .bind(session.user_id)
        .execute(&mut *tx)
        .await
        .context("Failed to credit points")?;

    if credited.rows_affected() == 0 {
        tx.rollback().await.context("Failed to roll back transaction")?;
        anyhow::bail!("User {} disappeared while closing session {}", session.user_id, session.id);
    }

    tx.commit().await.context("Failed to commit session stop")?;
    Ok(true)
}

fn row_to_session_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Session> {
    let status: String = row.try_get("status")?;
    Ok(Session {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        campaign_id: row.try_get("campaign_id")?,
        status: parse_status(&status)?,
        start_at: row.try_get("start_at")?,
        end_at: row.try_get("end_at")?,
    })
}
