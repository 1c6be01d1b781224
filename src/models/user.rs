//! User model
//!
//! A volunteer (or campaign creator) and their reward point balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CatalogEntry;

/// Points a user must exceed to earn a certificate of appreciation.
pub const CERTIFICATE_THRESHOLD: i64 = 19;

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Home town, free text
    pub city: String,
    /// Short personal introduction
    pub info: String,
    /// Reward point balance. Only ever increased, by stopping a session.
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a user that has not been stored yet.
    ///
    /// A blank `full_name` falls back to the local part of the email address.
    pub fn new(username: String, email: String, full_name: Option<String>) -> Self {
        let full_name = match full_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => email_local_part(&email).to_string(),
        };
        Self {
            id: 0,
            username,
            email,
            full_name,
            city: String::new(),
            info: String::new(),
            points: 0,
            created_at: Utc::now(),
        }
    }

    pub fn is_certificate_eligible(&self) -> bool {
        self.points > CERTIFICATE_THRESHOLD
    }
}

fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Input for creating a user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Partial profile update.
///
/// Absent fields are left alone. `skills` and `interests` replace the
/// current set when present, so an empty list clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileInput {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<i64>>,
    #[serde(default)]
    pub interests: Option<Vec<i64>>,
}

/// A user together with their skills and interests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    pub skills: Vec<CatalogEntry>,
    pub interests: Vec<CatalogEntry>,
}

/// Certificate eligibility of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub user_id: i64,
    pub full_name: String,
    pub points: i64,
    pub eligible: bool,
    /// Set only when the user is eligible
    pub issued_on: Option<chrono::NaiveDate>,
}
