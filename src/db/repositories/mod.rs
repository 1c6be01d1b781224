//! Database repositories
//!
//! One repository per entity. Each exposes a trait plus an sqlx
//! implementation that dispatches on the configured driver.

pub mod campaign;
pub mod catalog;
pub mod event;
pub mod session;
pub mod user;

pub use campaign::{CampaignRepository, SqlxCampaignRepository};
pub use catalog::{CatalogRepository, SqlxCatalogRepository};
pub use event::{EventRepository, SqlxEventRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};

/// True when a statement failed on a UNIQUE constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
