use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

pub const UNTITLED: &str = "(No Title)";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl EventStatus {
    /// Accepts both spellings of cancelled. Anything unknown means "no status".
    pub fn parse(status: &str) -> Option<Self> {
        match status.trim().to_lowercase().as_str() {
            "confirmed" => Some(Self::Confirmed),
            "tentative" => Some(Self::Tentative),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Tentative => "tentative",
            Self::Cancelled => "cancelled",
        }
    }
}

/// An event as the calendar store reports it. Recurring events carry
/// their rule and the start of the first instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub uid: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub location: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub attendees: Option<Vec<String>>,
    pub status: Option<EventStatus>,
    pub recurrence: Option<String>,
}

impl Event {
    pub fn new(
        uid: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            start,
            end,
            all_day: false,
            location: None,
            description: None,
            url: None,
            attendees: None,
            status: None,
            recurrence: None,
        }
    }

    pub fn with_recurrence(mut self, rule: impl Into<String>) -> Self {
        self.recurrence = Some(rule.into());
        self
    }

    pub fn duration(&self) -> Duration {
        self.end.signed_duration_since(self.start)
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.as_deref().is_some_and(|r| !r.trim().is_empty())
    }

    /// Materializes the instance of this event starting at `start`.
    pub fn occurrence_at(&self, start: DateTime<Utc>) -> Occurrence {
        Occurrence {
            uid: self.uid.clone(),
            title: self.title.clone(),
            start,
            end: start + self.duration(),
            all_day: self.all_day,
            location: self.location.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
            attendees: self.attendees.clone(),
            status: self.status,
        }
    }
}

/// One concrete instance of an event inside the export window.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub uid: String,
    pub title: String,
    #[serde(serialize_with = "serialize_instant")]
    pub start: DateTime<Utc>,
    #[serde(serialize_with = "serialize_instant")]
    pub end: DateTime<Utc>,
    pub all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
}

impl Occurrence {
    pub fn duration(&self) -> Duration {
        self.end.signed_duration_since(self.start)
    }
}

impl From<Event> for Occurrence {
    fn from(event: Event) -> Self {
        Self {
            uid: event.uid,
            title: event.title,
            start: event.start,
            end: event.end,
            all_day: event.all_day,
            location: event.location,
            description: event.description,
            url: event.url,
            attendees: event.attendees,
            status: event.status,
        }
    }
}

/// Anything identified by a uid and placed at a start instant.
pub trait Scheduled {
    fn uid(&self) -> &str;
    fn start(&self) -> DateTime<Utc>;
}

impl Scheduled for Event {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn start(&self) -> DateTime<Utc> {
        self.start
    }
}

impl Scheduled for Occurrence {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn start(&self) -> DateTime<Utc> {
        self.start
    }
}

fn serialize_instant<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, 0, 0).unwrap()
    }

    #[test]
    fn status_accepts_both_spellings() {
        assert_eq!(EventStatus::parse("Canceled"), Some(EventStatus::Cancelled));
        assert_eq!(EventStatus::parse("cancelled"), Some(EventStatus::Cancelled));
        assert_eq!(EventStatus::parse("TENTATIVE"), Some(EventStatus::Tentative));
        assert_eq!(EventStatus::parse("none"), None);
        assert_eq!(EventStatus::parse(""), None);
    }

    #[test]
    fn occurrence_keeps_duration_and_drops_rule() {
        let event = Event::new("E1", "Standup", at(9), at(10)).with_recurrence("FREQ=DAILY");
        let occ = event.occurrence_at(at(14));

        assert_eq!(occ.uid, "E1");
        assert_eq!(occ.start, at(14));
        assert_eq!(occ.end, at(15));
        assert_eq!(occ.duration(), event.duration());
    }

    #[test]
    fn blank_rule_is_not_recurring() {
        let event = Event::new("E1", "Standup", at(9), at(10)).with_recurrence("  ");
        assert!(!event.is_recurring());
    }
}
