use chrono::{DateTime, TimeDelta, Utc};
use rrule::{RRule, Tz, Unvalidated};
use thiserror::Error;
use tracing::{debug, trace};

use crate::calendar::events::{Event, Occurrence};

#[derive(Debug, Error)]
pub enum RecurrenceError {
    #[error("invalid recurrence rule `{rule}`: {reason}")]
    Invalid { rule: String, reason: String },
    #[error("recurrence rule `{rule}` stopped yielding dates after {after}")]
    Stalled { rule: String, after: DateTime<Utc> },
}

/// A recurring event whose rule could not be interpreted.
#[derive(Debug, Error)]
#[error("cannot expand recurring event {uid}")]
pub struct ExpandError {
    pub uid: String,
    #[source]
    pub source: RecurrenceError,
}

/// Turns an encoded recurrence rule into concrete start instants.
pub trait RecurrenceInterpreter {
    /// Starts of the rule anchored at `anchor` that fall in the query range.
    /// The lower bound is inclusive; callers must not rely on the upper one.
    fn occurrences(
        &self,
        anchor: DateTime<Utc>,
        rule: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, RecurrenceError>;
}

/// RFC 5545 `RRULE` bodies, evaluated in UTC by the `rrule` crate.
///
/// Rules are anchored at the event's UTC start, so a series created at a
/// fixed local hour shifts by the DST offset on the far side of a
/// daylight-saving change.
#[derive(Debug, Default, Clone, Copy)]
pub struct RRuleInterpreter;

const PAGE_SIZE: u16 = u16::MAX;

impl RecurrenceInterpreter for RRuleInterpreter {
    fn occurrences(
        &self,
        anchor: DateTime<Utc>,
        rule: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, RecurrenceError> {
        let body = normalize_rule(rule);
        let invalid = |reason: String| RecurrenceError::Invalid {
            rule: body.clone(),
            reason,
        };

        let parsed = body
            .parse::<RRule<Unvalidated>>()
            .map_err(|e| invalid(e.to_string()))?;
        let rule_set = parsed
            .build(anchor.with_timezone(&Tz::UTC))
            .map_err(|e| invalid(e.to_string()))?;

        // `all` stops at PAGE_SIZE dates; keep paging from the last one.
        let mut starts = Vec::new();
        let mut after = range_start - TimeDelta::seconds(1);
        loop {
            let page = rule_set
                .clone()
                .after(after.with_timezone(&Tz::UTC))
                .before(range_end.with_timezone(&Tz::UTC))
                .all(PAGE_SIZE);

            let cursor = after;
            starts.extend(
                page.dates
                    .into_iter()
                    .map(|dt| dt.with_timezone(&Utc))
                    .filter(|dt| *dt > cursor && *dt >= range_start),
            );
            if !page.limited {
                break;
            }

            match starts.last() {
                Some(last) if *last > after => {
                    debug!(rule = %body, after = %last, "fetching next page of occurrences");
                    after = *last;
                }
                _ => {
                    return Err(RecurrenceError::Stalled {
                        rule: body.clone(),
                        after,
                    })
                }
            }
        }

        Ok(starts)
    }
}

/// Strips an `RRULE:` prefix and widens a date-only `UNTIL` to the end of
/// that day, since the anchor handed to `rrule` is always a UTC date-time.
fn normalize_rule(rule: &str) -> String {
    rule_body(rule)
        .split(';')
        .map(|part| match part.split_once('=') {
            Some((key, value))
                if key.eq_ignore_ascii_case("UNTIL") && value.len() == 8 && !value.contains('T') =>
            {
                format!("{key}={value}T235959Z")
            }
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn rule_body(rule: &str) -> &str {
    let rule = rule.trim();
    match rule.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &rule[6..],
        _ => rule,
    }
}

/// Materializes every instance of `events` whose start lies in
/// `[range_start, range_end)`. Order is not meaningful; see
/// [`crate::dedupe::dedupe_and_sort`].
pub fn expand<I: RecurrenceInterpreter + ?Sized>(
    events: &[Event],
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    interpreter: &I,
) -> Result<Vec<Occurrence>, ExpandError> {
    let mut occurrences = Vec::with_capacity(events.len());

    for event in events {
        let Some(rule) = event.recurrence.as_deref().filter(|_| event.is_recurring()) else {
            if event.start >= range_start && event.start < range_end {
                occurrences.push(event.occurrence_at(event.start));
            } else {
                trace!(uid = %event.uid, start = %event.start, "outside window");
            }
            continue;
        };

        let starts = interpreter
            .occurrences(event.start, rule, range_start, range_end)
            .map_err(|source| ExpandError {
                uid: event.uid.clone(),
                source,
            })?;

        let before = occurrences.len();
        // The interpreter may or may not include the upper bound.
        occurrences.extend(
            starts
                .into_iter()
                .filter(|t| *t < range_end)
                .map(|t| event.occurrence_at(t)),
        );
        trace!(uid = %event.uid, count = occurrences.len() - before, "expanded");
    }

    debug!(
        events = events.len(),
        occurrences = occurrences.len(),
        "expanded events"
    );
    Ok(occurrences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    /// Returns fixed instants regardless of the rule.
    struct Canned(Vec<DateTime<Utc>>);

    impl RecurrenceInterpreter for Canned {
        fn occurrences(
            &self,
            _anchor: DateTime<Utc>,
            _rule: &str,
            _range_start: DateTime<Utc>,
            _range_end: DateTime<Utc>,
        ) -> Result<Vec<DateTime<Utc>>, RecurrenceError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn clips_single_events_to_window() {
        let start = utc(2024, 1, 1, 0);
        let end = utc(2024, 1, 8, 0);
        let events = vec![
            Event::new("before", "x", utc(2023, 12, 31, 23), utc(2024, 1, 1, 1)),
            Event::new("first", "x", start, utc(2024, 1, 1, 1)),
            Event::new("inside", "x", utc(2024, 1, 3, 9), utc(2024, 1, 3, 10)),
            Event::new("at-end", "x", end, utc(2024, 1, 8, 1)),
        ];

        let out = expand(&events, start, end, &RRuleInterpreter).unwrap();
        let uids: Vec<&str> = out.iter().map(|o| o.uid.as_str()).collect();
        assert_eq!(uids, vec!["first", "inside"]);
        assert_eq!(out[1], Occurrence::from(events[2].clone()));
    }

    #[test]
    fn weekly_rule_yields_three_mondays() {
        let event = Event::new("E1", "Sync", utc(2024, 1, 1, 9), utc(2024, 1, 1, 10))
            .with_recurrence("FREQ=WEEKLY");

        let out = expand(&[event], utc(2024, 1, 1, 0), utc(2024, 1, 22, 0), &RRuleInterpreter)
            .unwrap();

        let starts: Vec<_> = out.iter().map(|o| o.start).collect();
        assert_eq!(
            starts,
            vec![utc(2024, 1, 1, 9), utc(2024, 1, 8, 9), utc(2024, 1, 15, 9)]
        );
        for occ in &out {
            assert_eq!(occ.uid, "E1");
            assert_eq!(occ.end - occ.start, Duration::hours(1));
        }
    }

    #[test]
    fn drops_instant_equal_to_range_end() {
        let start = utc(2024, 1, 1, 0);
        let end = utc(2024, 1, 3, 0);
        let event = Event::new("E1", "x", utc(2024, 1, 1, 0), utc(2024, 1, 1, 2))
            .with_recurrence("FREQ=DAILY");
        let interpreter = Canned(vec![utc(2024, 1, 1, 0), utc(2024, 1, 2, 0), end]);

        let out = expand(&[event], start, end, &interpreter).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|o| o.start < end));
    }

    #[test]
    fn recurring_master_before_window_still_expands() {
        let event = Event::new("E1", "x", utc(2023, 6, 5, 9), utc(2023, 6, 5, 9) + Duration::minutes(45))
            .with_recurrence("RRULE:FREQ=WEEKLY;BYDAY=MO");

        let out = expand(&[event], utc(2024, 1, 1, 0), utc(2024, 1, 8, 0), &RRuleInterpreter)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start, utc(2024, 1, 1, 9));
        assert_eq!(out[0].duration(), Duration::minutes(45));
    }

    #[test]
    fn malformed_rule_fails_the_whole_call() {
        let events = vec![
            Event::new("ok", "x", utc(2024, 1, 2, 9), utc(2024, 1, 2, 10)),
            Event::new("bad", "x", utc(2024, 1, 2, 9), utc(2024, 1, 2, 10))
                .with_recurrence("FREQ=SOMETIMES"),
        ];

        let err = expand(&events, utc(2024, 1, 1, 0), utc(2024, 1, 8, 0), &RRuleInterpreter)
            .unwrap_err();
        assert_eq!(err.uid, "bad");
        assert!(matches!(err.source, RecurrenceError::Invalid { .. }));
    }

    #[test]
    fn empty_input_is_empty_output() {
        let out = expand(&[], utc(2024, 1, 1, 0), utc(2024, 1, 8, 0), &RRuleInterpreter).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn strips_rrule_prefix() {
        assert_eq!(rule_body(" RRULE:FREQ=DAILY "), "FREQ=DAILY");
        assert_eq!(rule_body("rrule:FREQ=DAILY"), "FREQ=DAILY");
        assert_eq!(rule_body("FREQ=DAILY"), "FREQ=DAILY");
    }

    #[test]
    fn widens_date_only_until() {
        assert_eq!(
            normalize_rule("FREQ=WEEKLY;INTERVAL=1;UNTIL=20240110"),
            "FREQ=WEEKLY;INTERVAL=1;UNTIL=20240110T235959Z"
        );
        assert_eq!(
            normalize_rule("FREQ=DAILY;UNTIL=20240110T090000Z"),
            "FREQ=DAILY;UNTIL=20240110T090000Z"
        );
    }

    #[test]
    fn date_only_until_is_inclusive_of_that_day() {
        let event = Event::new("E1", "x", utc(2024, 1, 1, 9), utc(2024, 1, 1, 10))
            .with_recurrence("FREQ=WEEKLY;UNTIL=20240108");

        let out = expand(&[event], utc(2024, 1, 1, 0), utc(2024, 2, 1, 0), &RRuleInterpreter)
            .unwrap();
        let starts: Vec<_> = out.iter().map(|o| o.start).collect();
        assert_eq!(starts, vec![utc(2024, 1, 1, 9), utc(2024, 1, 8, 9)]);
    }

    #[test]
    fn dense_rule_is_not_truncated() {
        let event = Event::new("tick", "x", utc(2024, 1, 1, 0), utc(2024, 1, 1, 0) + Duration::seconds(30))
            .with_recurrence("FREQ=MINUTELY");

        let out = expand(&[event], utc(2024, 1, 1, 0), utc(2024, 3, 1, 0), &RRuleInterpreter)
            .unwrap();
        // 60 days of minutes, well past a single page.
        assert_eq!(out.len(), 60 * 24 * 60);
        assert_eq!(out[0].start, utc(2024, 1, 1, 0));
        assert_eq!(out.last().unwrap().start, utc(2024, 3, 1, 0) - Duration::minutes(1));
        assert!(out.windows(2).all(|w| w[1].start - w[0].start == Duration::minutes(1)));
    }
}
