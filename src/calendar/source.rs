use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

use super::error::CalendarError;
use super::events::{Event, EventStatus, UNTITLED};

/// A store that can enumerate calendars and return the events of one of them.
pub trait CalendarSource {
    fn list_calendars(&self) -> Result<Vec<String>, CalendarError>;

    /// Events of `calendar` that may have an instance in `[start, end)`.
    /// Recurring events are returned unexpanded.
    fn fetch_events(
        &self,
        calendar: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>, CalendarError>;
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRecord {
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    title: Option<String>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    all_day: bool,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    attendees: Option<Vec<String>>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    recurrence: Option<String>,
}

impl EventRecord {
    fn into_event(self) -> Event {
        let attendees = self
            .attendees
            .map(|names| names.into_iter().filter(|n| !n.is_empty()).collect::<Vec<_>>())
            .filter(|names| !names.is_empty());

        Event {
            uid: non_empty(self.uid).unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: non_empty(self.title).unwrap_or_else(|| UNTITLED.to_string()),
            start: self.start,
            end: self.end,
            all_day: self.all_day,
            location: non_empty(self.location),
            description: non_empty(self.description),
            url: non_empty(self.url),
            attendees,
            status: self.status.as_deref().and_then(EventStatus::parse),
            recurrence: non_empty(self.recurrence),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Events loaded from a JSON document mapping calendar names to event lists.
#[derive(Debug)]
pub struct JsonFileSource {
    calendars: BTreeMap<String, Vec<EventRecord>>,
}

impl JsonFileSource {
    pub fn open(path: &Path) -> Result<Self, CalendarError> {
        debug!(path = %path.display(), "loading calendar export");
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, CalendarError> {
        let calendars = serde_json::from_str(text)?;
        Ok(Self { calendars })
    }
}

impl CalendarSource for JsonFileSource {
    fn list_calendars(&self) -> Result<Vec<String>, CalendarError> {
        Ok(self.calendars.keys().cloned().collect())
    }

    fn fetch_events(
        &self,
        calendar: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>, CalendarError> {
        let records = self
            .calendars
            .get(calendar)
            .ok_or_else(|| CalendarError::NotFound {
                name: calendar.to_string(),
                available: self.calendars.keys().cloned().collect(),
            })?;

        // Recurring masters may begin long before the window.
        let events: Vec<Event> = records
            .iter()
            .filter(|r| {
                let recurring = r.recurrence.as_deref().is_some_and(|s| !s.trim().is_empty());
                (recurring && r.start < end) || (r.start >= start && r.start < end)
            })
            .cloned()
            .map(EventRecord::into_event)
            .collect();

        debug!(calendar, count = events.len(), "fetched events");
        Ok(events)
    }
}
