use chrono::{DateTime, Utc};
use objc2::rc::Retained;
use objc2_event_kit::{EKEventStatus, EKEventStore};
use tracing::{debug, warn};

use super::error::CalendarError;
use super::events::{Event, EventStatus, UNTITLED};
use super::source::CalendarSource;
use crate::ffi::event_kit::{self, AccessResponse, EventProperties};

/// The system calendar database, read through EventKit.
///
/// EventKit returns recurring events already split into instances, so
/// events from this source never carry a recurrence rule.
pub struct EventKitSource {
    store: Retained<EKEventStore>,
}

impl EventKitSource {
    pub fn connect() -> Result<Self, CalendarError> {
        let store = event_kit::init_event_store();
        match event_kit::request_calendar_access(&store) {
            AccessResponse::Granted => {
                debug!("calendar access granted");
                Ok(Self { store })
            }
            AccessResponse::Denied => Err(CalendarError::AccessDenied),
            AccessResponse::Failed(reason) => Err(CalendarError::AccessRequest { reason }),
        }
    }
}

impl CalendarSource for EventKitSource {
    fn list_calendars(&self) -> Result<Vec<String>, CalendarError> {
        Ok(event_kit::event_calendars(&self.store)
            .iter()
            .map(|c| event_kit::calendar_title(c))
            .collect())
    }

    fn fetch_events(
        &self,
        calendar: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>, CalendarError> {
        let calendars = event_kit::event_calendars(&self.store);
        let target = calendars
            .iter()
            .find(|c| event_kit::calendar_title(c) == calendar)
            .ok_or_else(|| CalendarError::NotFound {
                name: calendar.to_string(),
                available: calendars.iter().map(|c| event_kit::calendar_title(c)).collect(),
            })?;

        let start_date = event_kit::date_from_timestamp(start.timestamp_millis() as f64 / 1000.0);
        let end_date = event_kit::date_from_timestamp(end.timestamp_millis() as f64 / 1000.0);

        let events: Vec<Event> = event_kit::fetch_events(&self.store, target, &start_date, &end_date)
            .iter()
            .filter_map(|e| parse_event(event_kit::get_event_properties(e)))
            .collect();

        debug!(calendar, count = events.len(), "fetched events");
        Ok(events)
    }
}

fn parse_event(props: EventProperties) -> Option<Event> {
    let (Some(start), Some(end)) = (timestamp_to_utc(props.start_ts), timestamp_to_utc(props.end_ts))
    else {
        warn!(uid = %props.identifier, "skipping event with invalid dates");
        return None;
    };

    let title = if props.title.is_empty() {
        UNTITLED.to_string()
    } else {
        props.title
    };

    Some(Event {
        uid: props.identifier,
        title,
        start,
        end,
        all_day: props.all_day,
        location: props.location.filter(|l| !l.is_empty()),
        description: props.notes.filter(|n| !n.is_empty()),
        url: props.url,
        attendees: Some(props.attendees).filter(|a| !a.is_empty()),
        status: parse_status(props.status),
        recurrence: None,
    })
}

fn parse_status(status: EKEventStatus) -> Option<EventStatus> {
    match status {
        EKEventStatus::Confirmed => Some(EventStatus::Confirmed),
        EKEventStatus::Tentative => Some(EventStatus::Tentative),
        EKEventStatus::Canceled => Some(EventStatus::Cancelled),
        _ => None,
    }
}

fn timestamp_to_utc(ts: f64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis((ts * 1000.0).round() as i64)
}
