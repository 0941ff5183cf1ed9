use crate::calendar::events::Occurrence;

pub fn format_json(occurrences: &[Occurrence]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(occurrences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::events::{Event, EventStatus};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    #[test]
    fn empty_list_is_empty_array() {
        assert_eq!(format_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn omits_absent_fields() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let mut event = Event::new("E1", "Sync", start, start + chrono::Duration::minutes(30));
        event.location = Some("Room 4".into());
        event.status = Some(EventStatus::Tentative);

        let text = format_json(&[event.into()]).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(
            value,
            json!([{
                "uid": "E1",
                "title": "Sync",
                "start": "2024-01-01T09:00:00.000Z",
                "end": "2024-01-01T09:30:00.000Z",
                "allDay": false,
                "location": "Room 4",
                "status": "tentative"
            }])
        );
        assert!(text.contains("\n  {\n    \"uid\""));
    }
}
