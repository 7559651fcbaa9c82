mod actor;
pub mod auth;
mod handle;
pub mod models;
pub mod time;
pub mod token;

pub use actor::filter_by_summary;
pub use handle::GoogleCalendarHandle;
pub use models::{CalendarEvent, EventDraft};
pub use token::{StoredToken, TokenManager};
