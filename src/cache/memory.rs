//! In-memory cache implementation using moka
//!
//! Values are stored as JSON so one cache can hold every listing type. Each
//! entry carries its own time-to-live, enforced through moka's [`Expiry`]
//! policy, so a caller asking for a short TTL really gets one.

use super::CacheLayer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_MAX_CAPACITY: u64 = 10_000;

const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Clone)]
struct CacheEntry {
    data: Arc<String>,
    ttl: Duration,
}

impl CacheEntry {
    fn new<T: Serialize>(value: &T, ttl: Duration) -> Result<Self> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        Ok(Self {
            data: Arc::new(json),
            ttl,
        })
    }

    fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).context("Failed to deserialize cache value")
    }
}

/// Expires every entry after the TTL it was stored with.
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, value: &CacheEntry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    // Overwriting a key restarts its clock with the new entry's TTL.
    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory cache using moka
pub struct MemoryCache {
    cache: Cache<String, CacheEntry>,
    default_ttl: Duration,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl MemoryCache {
    /// Create a cache holding up to 10,000 entries with a ten minute default TTL
    pub fn new() -> Self {
        Self::with_capacity_and_ttl(DEFAULT_MAX_CAPACITY, DEFAULT_TTL)
    }

    /// Create a cache with custom capacity and default TTL
    pub fn with_capacity_and_ttl(max_capacity: u64, default_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryTtl)
            .build();

        Self { cache, default_ttl }
    }

    /// TTL callers should use when they have no better idea
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Current number of entries (eventually consistent)
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Glob match where `*` spans any run of characters and `?` exactly one.
    ///
    /// `campaigns:*` matches `campaigns:list:1:100`; `sessions:list:user:?`
    /// matches `sessions:list:user:7` but not `sessions:list:user:17`.
    fn pattern_matches(pattern: &str, key: &str) -> bool {
        let pattern: Vec<char> = pattern.chars().collect();
        let key: Vec<char> = key.chars().collect();

        let (mut p, mut k) = (0, 0);
        // Position of the last `*` seen and the key index it was tried at.
        let mut backtrack: Option<(usize, usize)> = None;

        while k < key.len() {
            match pattern.get(p) {
                Some('*') => {
                    backtrack = Some((p, k));
                    p += 1;
                }
                Some('?') => {
                    p += 1;
                    k += 1;
                }
                Some(c) if *c == key[k] => {
                    p += 1;
                    k += 1;
                }
                _ => match backtrack {
                    Some((star, star_k)) => {
                        p = star + 1;
                        k = star_k + 1;
                        backtrack = Some((star, star_k + 1));
                    }
                    None => return false,
                },
            }
        }

        pattern[p..].iter().all(|c| *c == '*')
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheLayer for MemoryCache {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await {
            Some(entry) => Ok(Some(entry.deserialize()?)),
            None => Ok(None),
        }
    }

    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(value, ttl)?;
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    /// Delete every key matching a glob pattern.
    ///
    /// This walks the whole cache; fine for the few hundred listing keys the
    /// services create.
    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let doomed: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| Self::pattern_matches(pattern, key.as_ref()))
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        for key in doomed {
            self.cache.invalidate(&key).await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();

        cache.set("key1", &"value1".to_string(), MINUTE).await.unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new();

        let result: Option<String> = cache.get("nonexistent").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_get_with_wrong_type_is_error() {
        let cache = MemoryCache::new();

        cache.set("count", &"not a number".to_string(), MINUTE).await.unwrap();

        let result: Result<Option<i64>> = cache.get("count").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new();

        cache.set("key1", &"value1".to_string(), MINUTE).await.unwrap();
        cache.delete("key1").await.unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_delete_pattern_star() {
        let cache = MemoryCache::new();

        cache.set("campaigns:list:1:100", &vec![1, 2], MINUTE).await.unwrap();
        cache.set("campaigns:urgent", &vec![2], MINUTE).await.unwrap();
        cache.set("sessions:list:all", &vec![9], MINUTE).await.unwrap();

        cache.delete_pattern("campaigns:*").await.unwrap();

        let page: Option<Vec<i32>> = cache.get("campaigns:list:1:100").await.unwrap();
        let urgent: Option<Vec<i32>> = cache.get("campaigns:urgent").await.unwrap();
        let sessions: Option<Vec<i32>> = cache.get("sessions:list:all").await.unwrap();

        assert_eq!(page, None);
        assert_eq!(urgent, None);
        assert_eq!(sessions, Some(vec![9]));
    }

    #[tokio::test]
    async fn test_delete_pattern_question_mark() {
        let cache = MemoryCache::new();

        cache.set("sessions:list:user:1", &1, MINUTE).await.unwrap();
        cache.set("sessions:list:user:2", &2, MINUTE).await.unwrap();
        cache.set("sessions:list:user:10", &10, MINUTE).await.unwrap();

        cache.delete_pattern("sessions:list:user:?").await.unwrap();

        let one: Option<i32> = cache.get("sessions:list:user:1").await.unwrap();
        let two: Option<i32> = cache.get("sessions:list:user:2").await.unwrap();
        let ten: Option<i32> = cache.get("sessions:list:user:10").await.unwrap();

        assert_eq!(one, None);
        assert_eq!(two, None);
        assert_eq!(ten, Some(10));
    }

    #[tokio::test]
    async fn test_overwrite_existing_key() {
        let cache = MemoryCache::new();

        cache.set("key1", &"value1".to_string(), MINUTE).await.unwrap();
        cache.set("key1", &"value2".to_string(), MINUTE).await.unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value2".to_string()));
    }

    #[tokio::test]
    async fn test_per_entry_ttl_is_honoured() {
        // Default TTL is long; the short-lived entry must still expire on its own.
        let cache = MemoryCache::with_capacity_and_ttl(100, Duration::from_secs(3600));

        cache.set("short", &1, Duration::from_millis(10)).await.unwrap();
        cache.set("long", &2, MINUTE).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.cache.run_pending_tasks().await;

        let short: Option<i32> = cache.get("short").await.unwrap();
        let long: Option<i32> = cache.get("long").await.unwrap();
        assert_eq!(short, None);
        assert_eq!(long, Some(2));
    }

    #[tokio::test]
    async fn test_entry_count() {
        let cache = MemoryCache::new();
        assert_eq!(cache.entry_count(), 0);

        cache.set("key1", &"value1".to_string(), MINUTE).await.unwrap();
        cache.set("key2", &"value2".to_string(), MINUTE).await.unwrap();
        cache.cache.run_pending_tasks().await;

        assert_eq!(cache.entry_count(), 2);
    }

    #[test]
    fn test_pattern_matches() {
        assert!(MemoryCache::pattern_matches("campaigns:*", "campaigns:urgent"));
        assert!(MemoryCache::pattern_matches("campaigns:*", "campaigns:"));
        assert!(MemoryCache::pattern_matches("*:urgent", "campaigns:urgent"));
        assert!(MemoryCache::pattern_matches("*", "anything"));
        assert!(MemoryCache::pattern_matches("*", ""));
        assert!(!MemoryCache::pattern_matches("campaigns:*", "sessions:list:all"));

        assert!(MemoryCache::pattern_matches("user:?:sessions", "user:1:sessions"));
        assert!(!MemoryCache::pattern_matches("user:?:sessions", "user:10:sessions"));
        assert!(!MemoryCache::pattern_matches("?", ""));

        assert!(MemoryCache::pattern_matches("a*b*c", "axxbyyc"));
        assert!(MemoryCache::pattern_matches("*:*:*", "a:b:c"));
        assert!(!MemoryCache::pattern_matches("a*b", "axxbc"));

        assert!(MemoryCache::pattern_matches("exact", "exact"));
        assert!(!MemoryCache::pattern_matches("exact", "exactx"));
        assert!(!MemoryCache::pattern_matches("exactx", "exact"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(20))]

            /// An entry is readable right after it is stored and gone once its TTL passes.
            #[test]
            fn entries_expire_after_ttl(
                key in "[a-z]{1,10}",
                value in "[a-z]{1,100}"
            ) {
                let rt = tokio::runtime::Runtime::new().unwrap();
                rt.block_on(async {
                    let ttl = Duration::from_millis(10);
                    let cache = MemoryCache::with_capacity_and_ttl(1000, MINUTE);

                    cache.set(&key, &value, ttl).await.unwrap();
                    let fresh: Option<String> = cache.get(&key).await.unwrap();
                    prop_assert_eq!(fresh, Some(value.clone()));

                    tokio::time::sleep(Duration::from_millis(50)).await;
                    cache.cache.run_pending_tasks().await;

                    let stale: Option<String> = cache.get(&key).await.unwrap();
                    prop_assert_eq!(stale, None);
                    Ok(())
                })?;
            }

            /// A literal prefix followed by `*` matches exactly the keys with that prefix.
            #[test]
            fn prefix_star_matches_prefixed_keys(
                prefix in "[a-z:]{0,8}",
                rest in "[a-z0-9:]{0,8}",
                other in "[a-z0-9:]{0,16}"
            ) {
                let pattern = format!("{}*", prefix);
                let key = format!("{}{}", prefix, rest);
                prop_assert!(MemoryCache::pattern_matches(&pattern, &key));
                prop_assert_eq!(
                    MemoryCache::pattern_matches(&pattern, &other),
                    other.starts_with(&prefix)
                );
            }
        }
    }
}
