mod actor;
mod handle;
pub mod models;
pub mod time;

pub use handle::GoogleCalendarHandle;
pub use models::{CalendarEvent, GoogleCalendarSettings};
