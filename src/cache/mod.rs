//! Cache layer
//!
//! Read-mostly listings (campaign pages, the urgent list, session lists) are
//! kept in an in-process moka cache. Writers invalidate by glob pattern, so a
//! listing is never served stale after a mutation that affects it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use handon::cache::{create_cache, CacheLayer};
//! use handon::config::CacheConfig;
//!
//! let cache = create_cache(&CacheConfig::default());
//! cache.set("campaigns:list:1:100", &page, cache.default_ttl()).await?;
//! cache.delete_pattern("campaigns:*").await?;
//! ```

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

pub use memory::MemoryCache;

/// Cache layer trait
///
/// The generic methods keep this trait from being object safe, so services
/// hold the concrete [`Cache`] type.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Get a value from cache
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    /// Set a value in cache with TTL
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>;

    /// Delete a value from cache
    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete all values matching a glob pattern
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;
}

/// Cache used by the services
pub type Cache = MemoryCache;

/// Create the shared cache from configuration
pub fn create_cache(config: &CacheConfig) -> Arc<Cache> {
    let ttl = Duration::from_secs(config.ttl_seconds);
    Arc::new(MemoryCache::with_capacity_and_ttl(config.max_capacity, ttl))
}
