//! Catalogue repository
//!
//! Locations, skills and interests share one table shape, so a single
//! repository serves all three, keyed by [`CatalogKind`].

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CatalogEntry, CatalogKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

use super::is_unique_violation;

/// Catalogue repository trait
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Every entry of the catalogue, by name
    async fn list(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>>;

    async fn get_by_id(&self, kind: CatalogKind, id: i64) -> Result<Option<CatalogEntry>>;

    /// Add an entry. Returns `None` if the name is already taken.
    async fn create(&self, kind: CatalogKind, name: &str) -> Result<Option<CatalogEntry>>;

    /// Entries linked to a user, by name. Only skills and interests link to
    /// users.
    async fn list_for_user(&self, kind: CatalogKind, user_id: i64) -> Result<Vec<CatalogEntry>>;
}

/// SQLx-based catalogue repository implementation
pub struct SqlxCatalogRepository {
    pool: DynDatabasePool,
}

impl SqlxCatalogRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CatalogRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_entry_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<CatalogEntry> {
    Ok(CatalogEntry {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

fn row_to_entry_mysql(row: &sqlx::mysql::MySqlRow) -> Result<CatalogEntry> {
    Ok(CatalogEntry {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

#[async_trait]
impl CatalogRepository for SqlxCatalogRepository {
    async fn list(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>> {
        let sql = format!("SELECT id, name FROM {} ORDER BY name ASC, id ASC", kind.table());
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .fetch_all(self.pool.as_sqlite().unwrap())
                    .await
                    .with_context(|| format!("Failed to list {}", kind.table()))?;
                rows.iter().map(row_to_entry_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .fetch_all(self.pool.as_mysql().unwrap())
                    .await
                    .with_context(|| format!("Failed to list {}", kind.table()))?;
                rows.iter().map(row_to_entry_mysql).collect()
            }
        }
    }

    async fn get_by_id(&self, kind: CatalogKind, id: i64) -> Result<Option<CatalogEntry>> {
        let sql = format!("SELECT id, name FROM {} WHERE id = ?", kind.table());
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.as_sqlite().unwrap())
                    .await
                    .with_context(|| format!("Failed to get {} by ID", kind))?;
                row.as_ref().map(row_to_entry_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.as_mysql().unwrap())
                    .await
                    .with_context(|| format!("Failed to get {} by ID", kind))?;
                row.as_ref().map(row_to_entry_mysql).transpose()
            }
        }
    }

    async fn create(&self, kind: CatalogKind, name: &str) -> Result<Option<CatalogEntry>> {
        let sql = format!("INSERT INTO {} (name) VALUES (?)", kind.table());
        let inserted = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(&sql)
                .bind(name)
                .execute(self.pool.as_sqlite().unwrap())
                .await
                .map(|done| done.last_insert_rowid()),
            DatabaseDriver::Mysql => sqlx::query(&sql)
                .bind(name)
                .execute(self.pool.as_mysql().unwrap())
                .await
                .map(|done| done.last_insert_id() as i64),
        };

        match inserted {
            Ok(id) => Ok(Some(CatalogEntry {
                id,
                name: name.to_string(),
            })),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to create {}", kind)),
        }
    }

    async fn list_for_user(&self, kind: CatalogKind, user_id: i64) -> Result<Vec<CatalogEntry>> {
        let Some((link_table, column)) = kind.user_link() else {
            anyhow::bail!("Users cannot be linked to a {}", kind);
        };
        let sql = format!(
            "SELECT c.id, c.name FROM {table} c JOIN {link} l ON l.{column} = c.id \
             WHERE l.user_id = ? ORDER BY c.name ASC, c.id ASC",
            table = kind.table(),
            link = link_table,
            column = column,
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(&sql)
                    .bind(user_id)
                    .fetch_all(self.pool.as_sqlite().unwrap())
                    .await
                    .with_context(|| format!("Failed to list {} of user", kind.table()))?;
                rows.iter().map(row_to_entry_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(&sql)
                    .bind(user_id)
                    .fetch_all(self.pool.as_mysql().unwrap())
                    .await
                    .with_context(|| format!("Failed to list {} of user", kind.table()))?;
                rows.iter().map(row_to_entry_mysql).collect()
            }
        }
    }
}
