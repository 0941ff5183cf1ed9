use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Calendar access denied. Grant access in System Settings > Privacy & Security > Calendars.")]
    AccessDenied,
    #[error("Calendar access request failed: {reason}")]
    AccessRequest { reason: String },
    #[error("System calendar store unavailable; use --source to read a JSON export")]
    StoreUnavailable,
    #[error("Calendar not found: {name}. Available: {}", .available.join(", "))]
    NotFound { name: String, available: Vec<String> },
    #[error("Failed to read calendar source")]
    Io(#[from] std::io::Error),
    #[error("Malformed calendar data")]
    Parse(#[from] serde_json::Error),
}
