//! Catalogue service
//!
//! Lists and extends the location, skill and interest catalogues. Listings
//! are cached per catalogue and dropped whenever an entry is added.

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::CatalogRepository;
use crate::models::{CatalogEntry, CatalogKind};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

const CACHE_KEY_CATALOG: &str = "catalog:";

#[derive(Debug, thiserror::Error)]
pub enum CatalogServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Name already present in the catalogue
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: CatalogKind, name: String },

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Catalogue service
pub struct CatalogService {
    catalog_repo: Arc<dyn CatalogRepository>,
    cache: Arc<Cache>,
    cache_ttl: Duration,
}

impl CatalogService {
    pub fn new(catalog_repo: Arc<dyn CatalogRepository>, cache: Arc<Cache>) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            catalog_repo,
            cache,
            cache_ttl,
        }
    }

    /// Every entry of a catalogue, by name.
    pub async fn list(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>, CatalogServiceError> {
        let cache_key = cache_key(kind);

        if let Some(entries) = self
            .cache
            .get::<Vec<CatalogEntry>>(&cache_key)
            .await
            .ok()
            .flatten()
        {
            return Ok(entries);
        }

        let entries = self
            .catalog_repo
            .list(kind)
            .await
            .with_context(|| format!("Failed to list {}", kind.table()))?;

        let _ = self.cache.set(&cache_key, &entries, self.cache_ttl).await;

        Ok(entries)
    }

    /// Add an entry to a catalogue.
    ///
    /// # Errors
    /// - `ValidationError` for a blank or overlong name
    /// - `AlreadyExists` if the name is taken in this catalogue
    pub async fn create(
        &self,
        kind: CatalogKind,
        name: &str,
    ) -> Result<CatalogEntry, CatalogServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogServiceError::ValidationError(format!(
                "{} name cannot be empty",
                kind
            )));
        }
        if name.chars().count() > kind.max_name_len() {
            return Err(CatalogServiceError::ValidationError(format!(
                "{} name cannot be longer than {} characters",
                kind,
                kind.max_name_len()
            )));
        }

        let entry = self
            .catalog_repo
            .create(kind, name)
            .await?
            .ok_or_else(|| CatalogServiceError::AlreadyExists {
                kind,
                name: name.to_string(),
            })?;

        tracing::info!(%kind, id = entry.id, name = %entry.name, "Catalogue entry created");
        let _ = self.cache.delete(&cache_key(kind)).await;

        Ok(entry)
    }
}

fn cache_key(kind: CatalogKind) -> String {
    format!("{}{}", CACHE_KEY_CATALOG, kind.table())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::db::repositories::SqlxCatalogRepository;
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    async fn setup_test_service() -> (DynDatabasePool, CatalogService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let service = CatalogService::new(
            SqlxCatalogRepository::boxed(pool.clone()),
            Arc::new(MemoryCache::new()),
        );
        (pool, service)
    }

    #[tokio::test]
    async fn test_create_trims_and_rejects_duplicates() {
        let (_pool, service) = setup_test_service().await;

        let entry = service.create(CatalogKind::Skill, "  First aid ").await.unwrap();
        assert_eq!(entry.name, "First aid");

        let again = service.create(CatalogKind::Skill, "First aid").await;
        assert!(matches!(
            again,
            Err(CatalogServiceError::AlreadyExists { kind: CatalogKind::Skill, .. })
        ));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (_pool, service) = setup_test_service().await;

        let blank = service.create(CatalogKind::Location, "   ").await;
        let long = service.create(CatalogKind::Location, &"x".repeat(101)).await;

        assert!(matches!(blank, Err(CatalogServiceError::ValidationError(_))));
        assert!(matches!(long, Err(CatalogServiceError::ValidationError(_))));
        assert!(service
            .create(CatalogKind::Interest, &"x".repeat(101))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_list_is_cached_and_invalidated_on_create() {
        let (pool, service) = setup_test_service().await;
        service.create(CatalogKind::Interest, "Environment").await.unwrap();
        assert_eq!(service.list(CatalogKind::Interest).await.unwrap().len(), 1);

        // Written behind the service's back: still served from cache.
        pool.execute("INSERT INTO interests (name) VALUES ('Animals')")
            .await
            .unwrap();
        assert_eq!(service.list(CatalogKind::Interest).await.unwrap().len(), 1);

        // Other catalogues are cached separately.
        assert!(service.list(CatalogKind::Skill).await.unwrap().is_empty());

        service.create(CatalogKind::Interest, "Education").await.unwrap();
        let names: Vec<_> = service
            .list(CatalogKind::Interest)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Animals", "Education", "Environment"]);
    }
}
