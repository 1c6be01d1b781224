//! User service
//!
//! Implements business logic for the volunteer directory:
//! - User creation with username/email uniqueness
//! - Profile lookup including the point balance
//! - Volunteer history
//! - Certificate eligibility
//! - Profile with skills and interests, and partial profile updates

use crate::db::repositories::{CatalogRepository, SessionRepository, UserRepository};
use crate::models::{
    CatalogKind, Certificate, CreateUserInput, Profile, Session, UpdateProfileInput, User,
};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

const MAX_CITY_LEN: usize = 255;
const MAX_INFO_LEN: usize = 1000;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Username or email already taken
    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("User not found: {0}")]
    NotFound(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    catalog_repo: Arc<dyn CatalogRepository>,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        catalog_repo: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            catalog_repo,
        }
    }

    /// Create a new user with a zero point balance.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if username or email is blank, or the email has no `@`
    /// - `UserExists` if username or email is already taken
    /// - `InternalError` for database errors
    pub async fn create_user(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_string();
        validate_create_input(&username, &email)?;

        if self
            .user_repo
            .get_by_username(&username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        if self
            .user_repo
            .get_by_email(&email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        // The lookups above race with concurrent sign-ups; the unique keys
        // settle the tie.
        let user = User::new(username, email, input.full_name);
        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?
            .ok_or_else(|| {
                UserServiceError::UserExists(format!(
                    "Username '{}' or email '{}' is already taken",
                    user.username, user.email
                ))
            })?;

        tracing::info!(user_id = created.id, username = %created.username, "User created");

        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<User, UserServiceError> {
        self.user_repo
            .get_by_id(id)
            .await?
            .ok_or(UserServiceError::NotFound(id))
    }

    /// Every session the user has logged, newest first.
    pub async fn history(&self, user_id: i64) -> Result<Vec<Session>, UserServiceError> {
        self.get(user_id).await?;
        Ok(self
            .session_repo
            .list_by_user(user_id)
            .await
            .context("Failed to load volunteer history")?)
    }

    /// The user with their skills and interests.
    pub async fn profile(&self, user_id: i64) -> Result<Profile, UserServiceError> {
        let user = self.get(user_id).await?;
        let skills = self
            .catalog_repo
            .list_for_user(CatalogKind::Skill, user_id)
            .await
            .context("Failed to load skills")?;
        let interests = self
            .catalog_repo
            .list_for_user(CatalogKind::Interest, user_id)
            .await
            .context("Failed to load interests")?;

        Ok(Profile {
            user,
            skills,
            interests,
        })
    }

    /// Update the profile fields present in `input` and return the result.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user does not exist
    /// - `ValidationError` for a blank full name, overlong text, or an
    ///   unknown skill or interest id
    pub async fn update_profile(
        &self,
        user_id: i64,
        input: UpdateProfileInput,
    ) -> Result<Profile, UserServiceError> {
        self.get(user_id).await?;

        let changes = UpdateProfileInput {
            full_name: normalize_full_name(input.full_name)?,
            city: normalize_text(input.city, "City", MAX_CITY_LEN)?,
            info: normalize_text(input.info, "Info", MAX_INFO_LEN)?,
            skills: self.known_ids(CatalogKind::Skill, input.skills).await?,
            interests: self.known_ids(CatalogKind::Interest, input.interests).await?,
        };

        self.user_repo
            .update_profile(user_id, &changes)
            .await
            .context("Failed to update profile")?;

        tracing::info!(user_id, "Profile updated");

        self.profile(user_id).await
    }

    /// Deduplicate `ids` and check each names an entry of the catalogue.
    async fn known_ids(
        &self,
        kind: CatalogKind,
        ids: Option<Vec<i64>>,
    ) -> Result<Option<Vec<i64>>, UserServiceError> {
        let Some(mut ids) = ids else {
            return Ok(None);
        };
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(Some(ids));
        }

        let known: HashSet<i64> = self
            .catalog_repo
            .list(kind)
            .await
            .with_context(|| format!("Failed to load {}", kind.table()))?
            .into_iter()
            .map(|entry| entry.id)
            .collect();

        if let Some(unknown) = ids.iter().find(|id| !known.contains(*id)) {
            return Err(UserServiceError::ValidationError(format!(
                "Unknown {}: {}",
                kind, unknown
            )));
        }

        Ok(Some(ids))
    }

    pub async fn certificate(&self, user_id: i64) -> Result<Certificate, UserServiceError> {
        self.certificate_at(user_id, Utc::now()).await
    }

    /// Certificate eligibility as of `now`.
    ///
    /// The issue date is only set for eligible users.
    pub async fn certificate_at(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Certificate, UserServiceError> {
        let user = self.get(user_id).await?;
        let eligible = user.is_certificate_eligible();

        Ok(Certificate {
            user_id: user.id,
            full_name: user.full_name,
            points: user.points,
            eligible,
            issued_on: eligible.then(|| now.date_naive()),
        })
    }
}

fn normalize_full_name(full_name: Option<String>) -> Result<Option<String>, UserServiceError> {
    match full_name.map(|name| name.trim().to_string()) {
        Some(name) if name.is_empty() => Err(UserServiceError::ValidationError(
            "Full name cannot be empty".to_string(),
        )),
        other => Ok(other),
    }
}

fn normalize_text(
    value: Option<String>,
    field: &str,
    max_len: usize,
) -> Result<Option<String>, UserServiceError> {
    let value = value.map(|v| v.trim().to_string());
    if value.as_ref().is_some_and(|v| v.chars().count() > max_len) {
        return Err(UserServiceError::ValidationError(format!(
            "{} cannot be longer than {} characters",
            field, max_len
        )));
    }
    Ok(value)
}

fn validate_create_input(username: &str, email: &str) -> Result<(), UserServiceError> {
    if username.is_empty() {
        return Err(UserServiceError::ValidationError(
            "Username cannot be empty".to_string(),
        ));
    }
    if email.is_empty() {
        return Err(UserServiceError::ValidationError(
            "Email cannot be empty".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(UserServiceError::ValidationError(
            "Email must contain '@'".to_string(),
        ));
    }
    Ok(())
}
