//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub creator_id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub is_private: bool,
    pub start_at: DateTime<Utc>,
    /// Open-ended events have no end
    pub end_at: Option<DateTime<Utc>>,
    pub location_id: Option<i64>,
    /// Interest the event is filed under
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// An event stays available until its end time has passed.
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        self.end_at.map_or(true, |end| end >= now)
    }
}

/// Input for creating an event
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventInput {
    pub creator_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    pub start_at: DateTime<Utc>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub category_id: Option<i64>,
}

/// Listing filters; every field that is set must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct EventFilter {
    /// Still running (`true`) or already over (`false`)
    #[serde(default)]
    pub is_available: Option<bool>,
    /// Location id
    #[serde(default)]
    pub location: Option<i64>,
    /// Category (interest) id
    #[serde(default)]
    pub category: Option<i64>,
}

/// A user's registration for an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRegistration {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub registered_at: DateTime<Utc>,
}
