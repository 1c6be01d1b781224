//! Campaign model
//!
//! A help request volunteers log sessions against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How urgently a campaign needs volunteers.
///
/// Listings put `Urgent` first, then `Medium`, then `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UrgencyLevel {
    #[default]
    Low,
    Medium,
    Urgent,
}

impl UrgencyLevel {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "low",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::Urgent => "urgent",
        }
    }

    /// Listing position; lower sorts first
    pub fn rank(&self) -> u8 {
        match self {
            UrgencyLevel::Urgent => 0,
            UrgencyLevel::Medium => 1,
            UrgencyLevel::Low => 2,
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrgencyLevel::Low => write!(f, "Low"),
            UrgencyLevel::Medium => write!(f, "Medium"),
            UrgencyLevel::Urgent => write!(f, "Urgent"),
        }
    }
}

impl FromStr for UrgencyLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(UrgencyLevel::Low),
            "medium" => Ok(UrgencyLevel::Medium),
            "urgent" => Ok(UrgencyLevel::Urgent),
            _ => Err(anyhow::anyhow!("Invalid urgency level: {}", s)),
        }
    }
}

/// Campaign entity. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub creator_id: i64,
    pub title: String,
    pub body: String,
    pub image: Option<String>,
    pub urgency_level: UrgencyLevel,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(
        creator_id: i64,
        title: String,
        body: String,
        image: Option<String>,
        urgency_level: UrgencyLevel,
    ) -> Self {
        Self {
            id: 0,
            creator_id,
            title,
            body,
            image,
            urgency_level,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a campaign
///
/// `urgency_level` stays a string here; the service parses it so a bad value
/// is reported as a validation error rather than a body rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignInput {
    pub creator_id: i64,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub urgency_level: Option<String>,
}

/// Derived progress figures for one campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignAggregate {
    pub total_sessions: i64,
    pub total_volunteered_hours: i64,
    pub age_hours: i64,
}
