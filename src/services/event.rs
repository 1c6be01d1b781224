//! Event service
//!
//! Community events and user registration for them.

use crate::db::repositories::{CatalogRepository, EventRepository, UserRepository};
use crate::models::{CatalogKind, CreateEventInput, Event, EventFilter, EventRegistration};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Error types for event service operations
#[derive(Debug, thiserror::Error)]
pub enum EventServiceError {
    #[error("Event not found: {0}")]
    NotFound(i64),

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("User is already registered for this event")]
    AlreadyRegistered,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Event service
pub struct EventService {
    event_repo: Arc<dyn EventRepository>,
    user_repo: Arc<dyn UserRepository>,
    catalog_repo: Arc<dyn CatalogRepository>,
}

impl EventService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        user_repo: Arc<dyn UserRepository>,
        catalog_repo: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            event_repo,
            user_repo,
            catalog_repo,
        }
    }

    /// Create an event.
    ///
    /// # Errors
    /// - `ValidationError` for a blank title, an end before the start, or
    ///   an unknown location or category
    /// - `UserNotFound` if the creator does not exist
    pub async fn create_event(&self, input: CreateEventInput) -> Result<Event, EventServiceError> {
        if input.title.trim().is_empty() {
            return Err(EventServiceError::ValidationError(
                "Event title cannot be empty".to_string(),
            ));
        }
        if input.end_at.is_some_and(|end| end < input.start_at) {
            return Err(EventServiceError::ValidationError(
                "Event cannot end before it starts".to_string(),
            ));
        }

        self.user_repo
            .get_by_id(input.creator_id)
            .await?
            .ok_or(EventServiceError::UserNotFound(input.creator_id))?;
        self.ensure_catalog_entry(CatalogKind::Location, input.location_id)
            .await?;
        self.ensure_catalog_entry(CatalogKind::Interest, input.category_id)
            .await?;

        let event = Event {
            id: 0,
            creator_id: input.creator_id,
            title: input.title.trim().to_string(),
            description: input.description,
            image: input.image.filter(|url| !url.trim().is_empty()),
            is_private: input.is_private,
            start_at: input.start_at,
            end_at: input.end_at,
            location_id: input.location_id,
            category_id: input.category_id,
            created_at: Utc::now(),
        };
        let created = self
            .event_repo
            .create(&event)
            .await
            .context("Failed to create event")?;

        tracing::info!(event_id = created.id, creator_id = created.creator_id, "Event created");

        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Event, EventServiceError> {
        self.event_repo
            .get_by_id(id)
            .await?
            .ok_or(EventServiceError::NotFound(id))
    }

    async fn ensure_catalog_entry(
        &self,
        kind: CatalogKind,
        id: Option<i64>,
    ) -> Result<(), EventServiceError> {
        let Some(id) = id else {
            return Ok(());
        };
        match self.catalog_repo.get_by_id(kind, id).await? {
            Some(_) => Ok(()),
            None => Err(EventServiceError::ValidationError(format!(
                "Unknown {}: {}",
                kind, id
            ))),
        }
    }

    pub async fn list(&self, filter: EventFilter) -> Result<Vec<Event>, EventServiceError> {
        self.list_at(filter, Utc::now()).await
    }

    /// Events ordered by start time, narrowed by `filter`. Availability is
    /// judged at `now`.
    pub async fn list_at(
        &self,
        filter: EventFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, EventServiceError> {
        Ok(self
            .event_repo
            .list(&filter, now)
            .await
            .context("Failed to list events")?)
    }

    /// Register a user for an event.
    ///
    /// # Errors
    /// - `UserNotFound` / `NotFound` if the user or event is missing
    /// - `AlreadyRegistered` on a repeated registration
    pub async fn register(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> Result<EventRegistration, EventServiceError> {
        self.user_repo
            .get_by_id(user_id)
            .await?
            .ok_or(EventServiceError::UserNotFound(user_id))?;
        self.get(event_id).await?;

        let registration = self
            .event_repo
            .register(event_id, user_id, Utc::now())
            .await?
            .ok_or(EventServiceError::AlreadyRegistered)?;

        tracing::info!(event_id, user_id, "User registered for event");

        Ok(registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxCatalogRepository, SqlxEventRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};
    use chrono::{Duration, TimeZone};

    async fn setup_test_service() -> EventService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        pool.execute(
            "INSERT INTO users (id, username, email, full_name) VALUES (1, 'ana', 'ana@example.com', 'Ana'), (2, 'bo', 'bo@example.com', 'Bo')",
        )
        .await
        .unwrap();
        pool.execute("INSERT INTO locations (id, name) VALUES (1, 'Ramna Park'), (2, 'Old Town')")
            .await
            .unwrap();
        pool.execute("INSERT INTO interests (id, name) VALUES (1, 'Environment')")
            .await
            .unwrap();
        EventService::new(
            SqlxEventRepository::boxed(pool.clone()),
            SqlxUserRepository::boxed(pool.clone()),
            SqlxCatalogRepository::boxed(pool),
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    fn input(title: &str, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> CreateEventInput {
        CreateEventInput {
            creator_id: 1,
            title: title.to_string(),
            description: "Meet at the gate".to_string(),
            image: Some(String::new()),
            is_private: false,
            start_at: start,
            end_at: end,
            location_id: None,
            category_id: None,
        }
    }

    fn available(flag: Option<bool>) -> EventFilter {
        EventFilter {
            is_available: flag,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_event() {
        let service = setup_test_service().await;

        let created = service
            .create_event(input(" Tree planting ", now(), Some(now() + Duration::hours(3))))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.title, "Tree planting");
        assert_eq!(created.image, None);
        assert_eq!(service.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_event_validation() {
        let service = setup_test_service().await;

        let blank = service.create_event(input("", now(), None)).await;
        let backwards = service
            .create_event(input("Backwards", now(), Some(now() - Duration::minutes(1))))
            .await;
        let mut orphan = input("Orphan", now(), None);
        orphan.creator_id = 77;
        let orphan = service.create_event(orphan).await;

        assert!(matches!(blank, Err(EventServiceError::ValidationError(_))));
        assert!(matches!(backwards, Err(EventServiceError::ValidationError(_))));
        assert!(matches!(orphan, Err(EventServiceError::UserNotFound(77))));
    }

    #[tokio::test]
    async fn test_list_by_availability() {
        let service = setup_test_service().await;
        let over = service
            .create_event(input("over", now() - Duration::days(2), Some(now() - Duration::days(1))))
            .await
            .unwrap();
        let soon = service
            .create_event(input("soon", now() + Duration::days(1), None))
            .await
            .unwrap();

        let all = service.list_at(available(None), now()).await.unwrap();
        let open = service.list_at(available(Some(true)), now()).await.unwrap();
        let past = service.list_at(available(Some(false)), now()).await.unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(open, vec![soon]);
        assert_eq!(past, vec![over]);
    }

    #[tokio::test]
    async fn test_events_filed_by_location_and_category() {
        let service = setup_test_service().await;
        let mut park = input("Park cleanup", now(), None);
        park.location_id = Some(1);
        park.category_id = Some(1);
        let park = service.create_event(park).await.unwrap();
        let mut town = input("Old town walk", now() + Duration::hours(1), None);
        town.location_id = Some(2);
        let town = service.create_event(town).await.unwrap();

        assert_eq!(park.location_id, Some(1));
        assert_eq!(park.category_id, Some(1));

        let at_park = EventFilter {
            location: Some(1),
            ..Default::default()
        };
        let green = EventFilter {
            category: Some(1),
            ..Default::default()
        };
        let in_town = EventFilter {
            is_available: Some(true),
            location: Some(2),
            category: None,
        };
        assert_eq!(service.list_at(at_park, now()).await.unwrap(), vec![park.clone()]);
        assert_eq!(service.list_at(green, now()).await.unwrap(), vec![park]);
        assert_eq!(service.list_at(in_town, now()).await.unwrap(), vec![town]);

        let mut nowhere = input("Nowhere", now(), None);
        nowhere.location_id = Some(9);
        let mut uncategorised = input("Odd one", now(), None);
        uncategorised.category_id = Some(9);
        assert!(matches!(
            service.create_event(nowhere).await,
            Err(EventServiceError::ValidationError(_))
        ));
        assert!(matches!(
            service.create_event(uncategorised).await,
            Err(EventServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_register() {
        let service = setup_test_service().await;
        let event = service.create_event(input("Food drive", now(), None)).await.unwrap();

        let registration = service.register(2, event.id).await.unwrap();
        assert_eq!(registration.event_id, event.id);
        assert_eq!(registration.user_id, 2);

        assert!(matches!(
            service.register(2, event.id).await,
            Err(EventServiceError::AlreadyRegistered)
        ));
        assert!(matches!(
            service.register(9, event.id).await,
            Err(EventServiceError::UserNotFound(9))
        ));
        assert!(matches!(
            service.register(2, 404).await,
            Err(EventServiceError::NotFound(404))
        ));
    }
}
