pub mod args;
pub mod calendar;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod export;
#[cfg(target_os = "macos")]
mod ffi;
pub mod format;
pub mod logging;
pub mod recurrence;

pub use calendar::{CalendarSource, Event, Occurrence, Scheduled};
pub use dedupe::dedupe_and_sort;
pub use error::ExportError;
pub use recurrence::{expand, RRuleInterpreter, RecurrenceInterpreter};
