//! Session lifecycle controller
//!
//! Drives the per-(user, campaign) state machine
//! `Inactive --start--> Active --stop--> Inactive`. Stopping credits
//! `reward(elapsed whole hours)` to the user in the same storage transaction
//! that closes the session.
//!
//! Transitions on one pair are serialized by an in-process lock; the storage
//! layer backs this up with a compare-and-set on stop and a unique guard on
//! start. A lost storage race is retried once before being reported as an
//! invalid transition.
//!
//! The locked section runs on its own task. A caller that goes away mid
//! transition (a dropped HTTP request) does not cut it short, so listings
//! are always invalidated after a committed write.

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::{CampaignRepository, SessionRepository, UserRepository};
use crate::models::{Session, SessionStatus, SessionView};
use crate::services::pair_lock::PairLocks;
use crate::services::reward::{elapsed_hours, reward};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const CACHE_KEY_SESSIONS_ALL: &str = "sessions:list:all";
const CACHE_KEY_SESSIONS_BY_USER: &str = "sessions:list:user:";

/// Error types for session lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum SessionServiceError {
    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Campaign not found: {0}")]
    CampaignNotFound(i64),

    /// The requested transition is not allowed from the pair's current state
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// The requested status is not one the state machine knows
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Another writer changed the pair between our read and our write
    #[error("Storage conflict for user {user_id} on campaign {campaign_id}")]
    StorageConflict { user_id: i64, campaign_id: i64 },

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Parse a requested status from a request body.
pub fn parse_status(raw: &str) -> Result<SessionStatus, SessionServiceError> {
    SessionStatus::from_str(raw).map_err(|_| {
        SessionServiceError::InvalidArgument(format!(
            "status must be 'started' or 'stopped', got '{}'",
            raw
        ))
    })
}

/// Session lifecycle service
pub struct SessionService {
    inner: Arc<Ledger>,
}

/// State shared with the spawned transition tasks
struct Ledger {
    session_repo: Arc<dyn SessionRepository>,
    user_repo: Arc<dyn UserRepository>,
    campaign_repo: Arc<dyn CampaignRepository>,
    cache: Arc<Cache>,
    cache_ttl: Duration,
    locks: PairLocks,
}

impl SessionService {
    pub fn new(
        session_repo: Arc<dyn SessionRepository>,
        user_repo: Arc<dyn UserRepository>,
        campaign_repo: Arc<dyn CampaignRepository>,
        cache: Arc<Cache>,
    ) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            inner: Arc::new(Ledger {
                session_repo,
                user_repo,
                campaign_repo,
                cache,
                cache_ttl,
                locks: PairLocks::new(),
            }),
        }
    }

    /// Apply `status` to the (user, campaign) pair at the current time.
    pub async fn transition(
        &self,
        user_id: i64,
        campaign_id: i64,
        status: SessionStatus,
    ) -> Result<SessionView, SessionServiceError> {
        self.transition_at(user_id, campaign_id, status, Utc::now()).await
    }

    /// Apply `status` to the (user, campaign) pair as of `now`.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` / `CampaignNotFound` if either side is missing
    /// - `InvalidTransition` when starting an active pair, stopping an
    ///   inactive one, or losing a storage race twice in a row
    /// - `InternalError` for storage failures; nothing is persisted then
    pub async fn transition_at(
        &self,
        user_id: i64,
        campaign_id: i64,
        status: SessionStatus,
        now: DateTime<Utc>,
    ) -> Result<SessionView, SessionServiceError> {
        self.inner
            .user_repo
            .get_by_id(user_id)
            .await?
            .ok_or(SessionServiceError::UserNotFound(user_id))?;
        self.inner
            .campaign_repo
            .get_by_id(campaign_id)
            .await?
            .ok_or(SessionServiceError::CampaignNotFound(campaign_id))?;

        let ledger = self.inner.clone();
        tokio::spawn(async move { ledger.transition_locked(user_id, campaign_id, status, now).await })
            .await
            .context("Session transition task failed")?
    }

    /// Sessions, newest first, optionally only those of one user.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if `user_id` names no user
    pub async fn list(&self, user_id: Option<i64>) -> Result<Vec<Session>, SessionServiceError> {
        let ledger = &self.inner;
        let cache_key = match user_id {
            Some(id) => format!("{}{}", CACHE_KEY_SESSIONS_BY_USER, id),
            None => CACHE_KEY_SESSIONS_ALL.to_string(),
        };

        if let Some(sessions) = ledger.cache.get::<Vec<Session>>(&cache_key).await.ok().flatten() {
            return Ok(sessions);
        }

        let sessions = match user_id {
            Some(id) => {
                ledger
                    .user_repo
                    .get_by_id(id)
                    .await?
                    .ok_or(SessionServiceError::UserNotFound(id))?;
                ledger.session_repo.list_by_user(id).await
            }
            None => ledger.session_repo.list_all().await,
        }
        .context("Failed to list sessions")?;

        let _ = ledger.cache.set(&cache_key, &sessions, ledger.cache_ttl).await;

        Ok(sessions)
    }
}

impl Ledger {
    async fn transition_locked(
        &self,
        user_id: i64,
        campaign_id: i64,
        status: SessionStatus,
        now: DateTime<Utc>,
    ) -> Result<SessionView, SessionServiceError> {
        let _guard = self.locks.acquire(user_id, campaign_id).await;

        let outcome = match self.apply(user_id, campaign_id, status, now).await {
            Err(SessionServiceError::StorageConflict { .. }) => {
                tracing::warn!(user_id, campaign_id, %status, "Session write lost a race, retrying once");
                match self.apply(user_id, campaign_id, status, now).await {
                    Err(SessionServiceError::StorageConflict { .. }) => Err(
                        SessionServiceError::InvalidTransition(
                            "Session changed concurrently, please retry".to_string(),
                        ),
                    ),
                    other => other,
                }
            }
            other => other,
        };

        if let Ok(view) = &outcome {
            self.invalidate_cache(user_id).await;
            tracing::info!(
                user_id,
                campaign_id,
                session_id = view.session.id,
                status = %view.session.status,
                points = view.points_awarded,
                "Session transition applied"
            );
        }

        outcome
    }

    async fn apply(
        &self,
        user_id: i64,
        campaign_id: i64,
        status: SessionStatus,
        now: DateTime<Utc>,
    ) -> Result<SessionView, SessionServiceError> {
        let active = self.session_repo.find_active(user_id, campaign_id).await?;

        match (status, active) {
            (SessionStatus::Started, Some(_)) => Err(SessionServiceError::InvalidTransition(
                "User is already contributing to this campaign".to_string(),
            )),
            (SessionStatus::Started, None) => {
                match self.session_repo.start(user_id, campaign_id, now).await? {
                    Some(session) => Ok(SessionView {
                        session,
                        points_awarded: 0,
                    }),
                    None => Err(SessionServiceError::StorageConflict { user_id, campaign_id }),
                }
            }
            (SessionStatus::Stopped, None) => Err(SessionServiceError::InvalidTransition(
                "No active contribution to stop".to_string(),
            )),
            (SessionStatus::Stopped, Some(session)) => {
                let points = reward(elapsed_hours(session.start_at, now));
                if !self.session_repo.stop(&session, now, points).await? {
                    return Err(SessionServiceError::StorageConflict { user_id, campaign_id });
                }
                Ok(SessionView {
                    session: Session {
                        status: SessionStatus::Stopped,
                        end_at: Some(now),
                        ..session
                    },
                    points_awarded: points,
                })
            }
        }
    }

    async fn invalidate_cache(&self, user_id: i64) {
        let _ = self.cache.delete(CACHE_KEY_SESSIONS_ALL).await;
        let _ = self
            .cache
            .delete(&format!("{}{}", CACHE_KEY_SESSIONS_BY_USER, user_id))
            .await;
    }
}
