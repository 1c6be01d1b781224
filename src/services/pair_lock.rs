//! Per-(user, campaign) exclusive locks
//!
//! Serializes session transitions for one pair inside this process while
//! leaving unrelated pairs free to run concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

type PairKey = (i64, i64);
type LockMap = HashMap<PairKey, Arc<Mutex<()>>>;

/// Lazily created mutex per (user, campaign) pair
///
/// The map itself sits behind a std mutex: it is only held for a lookup or
/// a removal, never across an await, which lets [`PairGuard`] prune its
/// entry from `Drop`.
#[derive(Default)]
pub struct PairLocks {
    locks: Arc<StdMutex<LockMap>>,
}

/// Exclusive access to one pair.
///
/// Dropping the guard unlocks the pair and forgets its mutex once nobody
/// else holds or waits on it, including when the owning future is
/// cancelled mid-transition.
pub struct PairGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<StdMutex<LockMap>>,
    key: PairKey,
}

impl PairLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the pair.
    ///
    /// The pair stays locked until the returned guard is dropped.
    pub async fn acquire(&self, user_id: i64, campaign_id: i64) -> PairGuard {
        let key = (user_id, campaign_id);

        let lock = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        PairGuard {
            guard: Some(lock.lock_owned().await),
            locks: self.locks.clone(),
            key,
        }
    }

    /// Number of pairs with a live mutex
    pub fn tracked_pairs(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for PairGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // The map's own reference is the only one left when the pair is idle;
        // no new clone can appear while the map is locked.
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_pair_is_exclusive() {
        let locks = Arc::new(PairLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let tasks = (0..8).map(|_| {
            let locks = locks.clone();
            let inside = inside.clone();
            let max_inside = max_inside.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(1, 1).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            })
        });
        for result in futures::future::join_all(tasks).await {
            result.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locks.tracked_pairs(), 0);
    }

    #[tokio::test]
    async fn test_different_pairs_do_not_block() {
        let locks = PairLocks::new();

        let _a = locks.acquire(1, 1).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(1, 2)).await;
        let c = tokio::time::timeout(Duration::from_millis(100), locks.acquire(2, 1)).await;

        assert!(b.is_ok());
        assert!(c.is_ok());
    }

    #[tokio::test]
    async fn test_dropping_guard_forgets_idle_pairs_only() {
        let locks = PairLocks::new();

        let held = locks.acquire(1, 1).await;
        drop(locks.acquire(2, 2).await);
        assert_eq!(locks.tracked_pairs(), 1);

        drop(held);
        assert_eq!(locks.tracked_pairs(), 0);
    }

    #[tokio::test]
    async fn test_waiter_keeps_entry_alive() {
        let locks = Arc::new(PairLocks::new());
        let held = locks.acquire(1, 1).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(1, 1).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(held);
        assert_eq!(locks.tracked_pairs(), 1);

        waiter.await.unwrap();
        assert_eq!(locks.tracked_pairs(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_leaves_no_entry() {
        let locks = PairLocks::new();
        let held = locks.acquire(1, 1).await;

        let gave_up = tokio::time::timeout(Duration::from_millis(20), locks.acquire(1, 1)).await;
        assert!(gave_up.is_err());

        drop(held);
        assert_eq!(locks.tracked_pairs(), 0);
    }
}
