pub mod error;
pub mod events;
pub mod source;
#[cfg(target_os = "macos")]
pub mod store;

pub use error::CalendarError;
pub use events::{Event, EventStatus, Occurrence, Scheduled};
pub use source::{CalendarSource, JsonFileSource};
#[cfg(target_os = "macos")]
pub use store::EventKitSource;

use std::path::Path;

/// Opens the event source for this run: a JSON export when `path` is given,
/// otherwise the system calendar store.
pub fn open_source(path: Option<&Path>) -> Result<Box<dyn CalendarSource>, CalendarError> {
    match path {
        Some(path) => Ok(Box::new(JsonFileSource::open(path)?)),
        None => system_source(),
    }
}

#[cfg(target_os = "macos")]
fn system_source() -> Result<Box<dyn CalendarSource>, CalendarError> {
    Ok(Box::new(EventKitSource::connect()?))
}

#[cfg(not(target_os = "macos"))]
fn system_source() -> Result<Box<dyn CalendarSource>, CalendarError> {
    Err(CalendarError::StoreUnavailable)
}
