//! Event repository
//!
//! Events and the registrations of users for them.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Event, EventFilter, EventRegistration};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::sync::Arc;

use super::is_unique_violation;

/// Event repository trait
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Event>>;

    /// Events ordered by start time.
    ///
    /// `filter.is_available` filters on whether the event is still running
    /// at `now`: `Some(true)` keeps open or future-ending events,
    /// `Some(false)` keeps finished ones. Location and category filters
    /// match the event's ids exactly.
    async fn list(&self, filter: &EventFilter, now: DateTime<Utc>) -> Result<Vec<Event>>;

    /// Register a user for an event.
    ///
    /// Returns `None` if the user was already registered.
    async fn register(
        &self,
        event_id: i64,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<EventRegistration>>;
}

/// SQLx-based event repository implementation
pub struct SqlxEventRepository {
    pool: DynDatabasePool,
}

impl SqlxEventRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn EventRepository> {
        Arc::new(Self::new(pool))
    }
}

const EVENT_COLUMNS: &str = "id, creator_id, title, description, image, is_private, start_at, end_at, \
     location_id, category_id, created_at";

const INSERT_EVENT: &str = r#"
    INSERT INTO events (creator_id, title, description, image, is_private, start_at, end_at,
                        location_id, category_id, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const INSERT_REGISTRATION: &str =
    "INSERT INTO event_registrations (event_id, user_id, registered_at) VALUES (?, ?, ?)";

/// Placeholders appear in the order: `now`, location, category.
fn list_sql(filter: &EventFilter) -> String {
    let mut conditions = Vec::new();
    match filter.is_available {
        Some(true) => conditions.push("(end_at IS NULL OR end_at >= ?)"),
        Some(false) => conditions.push("(end_at IS NOT NULL AND end_at < ?)"),
        None => {}
    }
    if filter.location.is_some() {
        conditions.push("location_id = ?");
    }
    if filter.category.is_some() {
        conditions.push("category_id = ?");
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    format!(
        "SELECT {} FROM events {} ORDER BY start_at ASC, id ASC",
        EVENT_COLUMNS, where_clause
    )
}

fn row_to_event_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Event> {
    Ok(Event {
        id: row.try_get("id")?,
        creator_id: row.try_get("creator_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        image: row.try_get("image")?,
        is_private: row.try_get("is_private")?,
        start_at: row.try_get("start_at")?,
        end_at: row.try_get("end_at")?,
        location_id: row.try_get("location_id")?,
        category_id: row.try_get("category_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_event_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Event> {
    Ok(Event {
        id: row.try_get("id")?,
        creator_id: row.try_get("creator_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        image: row.try_get("image")?,
        is_private: row.try_get("is_private")?,
        start_at: row.try_get("start_at")?,
        end_at: row.try_get("end_at")?,
        location_id: row.try_get("location_id")?,
        category_id: row.try_get("category_id")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl EventRepository for SqlxEventRepository {
    async fn create(&self, event: &Event) -> Result<Event> {
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(INSERT_EVENT)
                    .bind(event.creator_id)
                    .bind(&event.title)
                    .bind(&event.description)
                    .bind(&event.image)
                    .bind(event.is_private)
                    .bind(event.start_at)
                    .bind(event.end_at)
                    .bind(event.location_id)
                    .bind(event.category_id)
                    .bind(event.created_at)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to create event")?
                    .last_insert_rowid()
            }
            DatabaseDriver::Mysql => {
                sqlx::query(INSERT_EVENT)
                    .bind(event.creator_id)
                    .bind(&event.title)
                    .bind(&event.description)
                    .bind(&event.image)
                    .bind(event.is_private)
                    .bind(event.start_at)
                    .bind(event.end_at)
                    .bind(event.location_id)
                    .bind(event.category_id)
                    .bind(event.created_at)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to create event")?
                    .last_insert_id() as i64
            }
        };

        Ok(Event {
            id,
            ..event.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Event>> {
        let sql = format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to get event by ID")?;
                row.as_ref().map(row_to_event_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .fetch_optional(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to get event by ID")?;
                row.as_ref().map(row_to_event_mysql).transpose()
            }
        }
    }

    async fn list(&self, filter: &EventFilter, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let sql = list_sql(filter);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let mut query = sqlx::query(&sql);
                if filter.is_available.is_some() {
                    query = query.bind(now);
                }
                if let Some(location) = filter.location {
                    query = query.bind(location);
                }
                if let Some(category) = filter.category {
                    query = query.bind(category);
                }
                let rows = query
                    .fetch_all(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to list events")?;
                rows.iter().map(row_to_event_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let mut query = sqlx::query(&sql);
                if filter.is_available.is_some() {
                    query = query.bind(now);
                }
                if let Some(location) = filter.location {
                    query = query.bind(location);
                }
                if let Some(category) = filter.category {
                    query = query.bind(category);
                }
                let rows = query
                    .fetch_all(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to list events")?;
                rows.iter().map(row_to_event_mysql).collect()
            }
        }
    }

    async fn register(
        &self,
        event_id: i64,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<EventRegistration>> {
        let inserted = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(INSERT_REGISTRATION)
                .bind(event_id)
                .bind(user_id)
                .bind(at)
                .execute(self.pool.as_sqlite().unwrap())
                .await
                .map(|done| done.last_insert_rowid()),
            DatabaseDriver::Mysql => sqlx::query(INSERT_REGISTRATION)
                .bind(event_id)
                .bind(user_id)
                .bind(at)
                .execute(self.pool.as_mysql().unwrap())
                .await
                .map(|done| done.last_insert_id() as i64),
        };

        match inserted {
            Ok(id) => Ok(Some(EventRegistration {
                id,
                event_id,
                user_id,
                registered_at: at,
            })),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e).context("Failed to register for event"),
        }
    }
}
