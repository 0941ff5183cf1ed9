use std::path::PathBuf;
use thiserror::Error;

use crate::calendar::CalendarError;
use crate::config::ConfigError;
use crate::recurrence::ExpandError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Expand(#[from] ExpandError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("--calendar is required")]
    MissingCalendar,
    #[error("--days must be a positive integer")]
    InvalidDays,
    #[error("Cannot represent an export window of {days} days starting today")]
    InvalidWindow { days: u32 },
    #[error("Failed to encode events")]
    Encode(#[from] serde_json::Error),
    #[error("Failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ExportError {
    /// A follow-up line for errors the user can fix by choosing another calendar.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingCalendar | Self::Calendar(CalendarError::NotFound { .. }) => {
                Some("Use --list-calendars to see available calendars")
            }
            _ => None,
        }
    }
}
