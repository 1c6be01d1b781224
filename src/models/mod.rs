//! Data models
//!
//! Database entities and the request/response types built on them.

mod campaign;
mod catalog;
mod event;
mod paging;
mod session;
mod user;

pub use campaign::{Campaign, CampaignAggregate, CreateCampaignInput, UrgencyLevel};
pub use catalog::{CatalogEntry, CatalogKind, CreateCatalogEntryInput};
pub use event::{CreateEventInput, Event, EventFilter, EventRegistration};
pub use paging::{ListParams, PagedResult, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use session::{Session, SessionStatus, SessionView};
pub use user::{
    Certificate, CreateUserInput, Profile, UpdateProfileInput, User, CERTIFICATE_THRESHOLD,
};
