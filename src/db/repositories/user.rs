//! User repository
//!
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing it for SQLite and MySQL
//!
//! Point balances are only written by the session repository, inside the
//! same transaction that closes a session.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{UpdateProfileInput, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use super::is_unique_violation;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, returning it with its assigned id.
    ///
    /// Returns `None` when the username or email is already taken.
    async fn create(&self, user: &User) -> Result<Option<User>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Apply a profile update in one transaction.
    ///
    /// Only fields present in `changes` are written; present skill and
    /// interest lists replace the user's current links.
    async fn update_profile(&self, user_id: i64, changes: &UpdateProfileInput) -> Result<()>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_user_sqlite(self.pool.as_sqlite().unwrap(), user).await,
            DatabaseDriver::Mysql => create_user_mysql(self.pool.as_mysql().unwrap(), user).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&select_user("id = ?"))
                    .bind(id)
                    .fetch_optional(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to get user by ID")?;
                row.as_ref().map(row_to_user_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&select_user("id = ?"))
                    .bind(id)
                    .fetch_optional(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to get user by ID")?;
                row.as_ref().map(row_to_user_mysql).transpose()
            }
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&select_user("username = ?"))
                    .bind(username)
                    .fetch_optional(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to get user by username")?;
                row.as_ref().map(row_to_user_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&select_user("username = ?"))
                    .bind(username)
                    .fetch_optional(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to get user by username")?;
                row.as_ref().map(row_to_user_mysql).transpose()
            }
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&select_user("email = ?"))
                    .bind(email)
                    .fetch_optional(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to get user by email")?;
                row.as_ref().map(row_to_user_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&select_user("email = ?"))
                    .bind(email)
                    .fetch_optional(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to get user by email")?;
                row.as_ref().map(row_to_user_mysql).transpose()
            }
        }
    }

    async fn update_profile(&self, user_id: i64, changes: &UpdateProfileInput) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_profile_sqlite(self.pool.as_sqlite().unwrap(), user_id, changes).await
            }
            DatabaseDriver::Mysql => {
                update_profile_mysql(self.pool.as_mysql().unwrap(), user_id, changes).await
            }
        }
    }
}

fn select_user(filter: &str) -> String {
    format!(
        "SELECT id, username, email, full_name, city, info, points, created_at FROM users WHERE {}",
        filter
    )
}

const UPDATE_PROFILE_FIELDS: &str = r#"
    UPDATE users
    SET full_name = COALESCE(?, full_name),
        city = COALESCE(?, city),
        info = COALESCE(?, info)
    WHERE id = ?
"#;

const CLEAR_SKILLS: &str = "DELETE FROM user_skills WHERE user_id = ?";
const LINK_SKILL: &str = "INSERT INTO user_skills (user_id, skill_id) VALUES (?, ?)";
const CLEAR_INTERESTS: &str = "DELETE FROM user_interests WHERE user_id = ?";
const LINK_INTEREST: &str = "INSERT INTO user_interests (user_id, interest_id) VALUES (?, ?)";

// ============================================================================
// SQLite implementations
// ============================================================================

const INSERT_USER: &str = r#"
    INSERT INTO users (username, email, full_name, points, created_at)
    VALUES (?, ?, ?, 0, ?)
"#;

async fn create_user_sqlite(pool: &SqlitePool, user: &User) -> Result<Option<User>> {
    let result = sqlx::query(INSERT_USER)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.created_at)
        .execute(pool)
        .await;

    match result {
        Ok(done) => Ok(Some(User {
            id: done.last_insert_rowid(),
            points: 0,
            ..user.clone()
        })),
        Err(e) if is_unique_violation(&e) => Ok(None),
        Err(e) => Err(e).context("Failed to create user"),
    }
}

async fn update_profile_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    changes: &UpdateProfileInput,
) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(UPDATE_PROFILE_FIELDS)
        .bind(&changes.full_name)
        .bind(&changes.city)
        .bind(&changes.info)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("Failed to update profile")?;

    if let Some(skills) = &changes.skills {
        sqlx::query(CLEAR_SKILLS)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear skills")?;
        for skill_id in skills {
            sqlx::query(LINK_SKILL)
                .bind(user_id)
                .bind(skill_id)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to link skill {}", skill_id))?;
        }
    }

    if let Some(interests) = &changes.interests {
        sqlx::query(CLEAR_INTERESTS)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear interests")?;
        for interest_id in interests {
            sqlx::query(LINK_INTEREST)
                .bind(user_id)
                .bind(interest_id)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to link interest {}", interest_id))?;
        }
    }

    tx.commit().await.context("Failed to commit profile update")?;
    Ok(())
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        full_name: row.try_get("full_name")?,
        city: row.try_get("city")?,
        info: row.try_get("info")?,
        points: row.try_get("points")?,
        created_at: row.try_get("created_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, user: &User) -> Result<Option<User>> {
    let result = sqlx::query(INSERT_USER)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.created_at)
        .execute(pool)
        .await;

    match result {
        Ok(done) => Ok(Some(User {
            id: done.last_insert_id() as i64,
            points: 0,
            ..user.clone()
        })),
        Err(e) if is_unique_violation(&e) => Ok(None),
        Err(e) => Err(e).context("Failed to create user"),
    }
}

async fn update_profile_mysql(
    pool: &MySqlPool,
    user_id: i64,
    changes: &UpdateProfileInput,
) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(UPDATE_PROFILE_FIELDS)
        .bind(&changes.full_name)
        .bind(&changes.city)
        .bind(&changes.info)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("Failed to update profile")?;

    if let Some(skills) = &changes.skills {
        sqlx::query(CLEAR_SKILLS)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear skills")?;
        for skill_id in skills {
            sqlx::query(LINK_SKILL)
                .bind(user_id)
                .bind(skill_id)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to link skill {}", skill_id))?;
        }
    }

    if let Some(interests) = &changes.interests {
        sqlx::query(CLEAR_INTERESTS)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear interests")?;
        for interest_id in interests {
            sqlx::query(LINK_INTEREST)
                .bind(user_id)
                .bind(interest_id)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to link interest {}", interest_id))?;
        }
    }

    tx.commit().await.context("Failed to commit profile update")?;
    Ok(())
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        full_name: row.try_get("full_name")?,
        city: row.try_get("city")?,
        info: row.try_get("info")?,
        points: row.try_get("points")?,
        created_at: row.try_get("created_at")?,
    })
}
