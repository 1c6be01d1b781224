//! Volunteering session model
//!
//! A session records one stretch of volunteering by a user on a campaign.
//! It is opened with status `Started` and closed exactly once, becoming
//! `Stopped` with an end timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    Started,
    Stopped,
}

impl SessionStatus {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Started => "started",
            SessionStatus::Stopped => "stopped",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Started => write!(f, "Started"),
            SessionStatus::Stopped => write!(f, "Stopped"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = anyhow::Error;

    /// Accepts `started`/`start` and `stopped`/`stop` in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "started" | "start" => Ok(SessionStatus::Started),
            "stopped" | "stop" => Ok(SessionStatus::Stopped),
            _ => Err(anyhow::anyhow!("Invalid session status: {}", s)),
        }
    }
}

/// Session entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub campaign_id: i64,
    pub status: SessionStatus,
    pub start_at: DateTime<Utc>,
    /// `None` while the session is active
    pub end_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Started && self.end_at.is_none()
    }

    /// End of the counted interval: the stop time, or `now` while still open.
    pub fn effective_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.end_at.unwrap_or(now)
    }
}

/// Result of a successful lifecycle transition
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub session: Session,
    /// Points credited by this transition (always 0 for a start)
    pub points_awarded: i64,
}
