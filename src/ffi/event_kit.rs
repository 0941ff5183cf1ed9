use objc2::rc::Retained;
use objc2_event_kit::{EKCalendar, EKEntityType, EKEvent, EKEventStatus, EKEventStore};
use objc2_foundation::{NSArray, NSDate};

/// Plain-Rust copy of the `EKEvent` fields the exporter reads.
pub struct EventProperties {
    pub identifier: String,
    pub title: String,
    pub start_ts: f64,
    pub end_ts: f64,
    pub all_day: bool,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub attendees: Vec<String>,
    pub status: EKEventStatus,
}

pub fn init_event_store() -> Retained<EKEventStore> {
    unsafe { EKEventStore::new() }
}

/// Outcome of the full-access prompt.
pub enum AccessResponse {
    Granted,
    Denied,
    /// EventKit reported an error instead of an answer.
    Failed(String),
}

/// Blocks until the user answers the full-access prompt.
pub fn request_calendar_access(store: &EKEventStore) -> AccessResponse {
    use block2::StackBlock;
    use objc2::runtime::Bool;
    use objc2_foundation::NSError;
    use std::sync::mpsc::channel;

    let (tx, rx) = channel();
    let handler = StackBlock::new(move |granted: Bool, error: *mut NSError| {
        // The error is only valid inside the handler; copy its text out.
        let failure = unsafe { error.as_ref().map(|e| e.localizedDescription().to_string()) };
        let response = match (granted.as_bool(), failure) {
            (true, _) => AccessResponse::Granted,
            (false, Some(reason)) => AccessResponse::Failed(reason),
            (false, None) => AccessResponse::Denied,
        };
        let _ = tx.send(response);
    });
    unsafe {
        store.requestFullAccessToEventsWithCompletion(&handler as *const _ as *mut _);
    }

    rx.recv()
        .unwrap_or_else(|_| AccessResponse::Failed("access prompt was dropped".to_string()))
}

pub fn event_calendars(store: &EKEventStore) -> Vec<Retained<EKCalendar>> {
    unsafe { store.calendarsForEntityType(EKEntityType::Event).to_vec() }
}

pub fn calendar_title(calendar: &EKCalendar) -> String {
    unsafe { calendar.title().to_string() }
}

pub fn fetch_events(
    store: &EKEventStore,
    calendar: &Retained<EKCalendar>,
    start: &NSDate,
    end: &NSDate,
) -> Vec<Retained<EKEvent>> {
    unsafe {
        let calendars = NSArray::from_retained_slice(std::slice::from_ref(calendar));
        let predicate =
            store.predicateForEventsWithStartDate_endDate_calendars(start, end, Some(&calendars));
        store.eventsMatchingPredicate(&predicate).to_vec()
    }
}

pub fn date_from_timestamp(ts: f64) -> Retained<NSDate> {
    NSDate::dateWithTimeIntervalSince1970(ts)
}

pub fn get_event_properties(event: &EKEvent) -> EventProperties {
    unsafe {
        let attendees = event
            .attendees()
            .map(|list| {
                list.to_vec()
                    .iter()
                    .filter_map(|p| p.name())
                    .map(|n| n.to_string())
                    .filter(|n| !n.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        EventProperties {
            identifier: event.calendarItemIdentifier().to_string(),
            title: event.title().to_string(),
            start_ts: event.startDate().timeIntervalSince1970(),
            end_ts: event.endDate().timeIntervalSince1970(),
            all_day: event.isAllDay(),
            location: event.location().map(|l| l.to_string()),
            notes: event.notes().map(|n| n.to_string()),
            url: event
                .URL()
                .and_then(|u| u.absoluteString())
                .map(|s| s.to_string()),
            attendees,
            status: event.status(),
        }
    }
}
