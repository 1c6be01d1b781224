//! Services layer - Business logic
//!
//! Services are responsible for:
//! - Implementing business rules
//! - Coordinating between repositories and cache
//! - Handling validation and error cases

pub mod aggregate;
pub mod campaign;
pub mod catalog;
pub mod event;
pub mod pair_lock;
pub mod reward;
pub mod session;
pub mod user;

pub use aggregate::aggregate;
pub use campaign::{CampaignService, CampaignServiceError};
pub use catalog::{CatalogService, CatalogServiceError};
pub use event::{EventService, EventServiceError};
pub use pair_lock::PairLocks;
pub use reward::{elapsed_hours, reward, POINTS_PER_HOUR};
pub use session::{parse_status, SessionService, SessionServiceError};
pub use user::{UserService, UserServiceError};
