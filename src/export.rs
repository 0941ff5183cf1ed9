use chrono::{DateTime, Days, NaiveDate, TimeDelta, TimeZone, Utc};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::calendar::{CalendarSource, Occurrence};
use crate::dedupe::dedupe_and_sort;
use crate::error::ExportError;
use crate::recurrence::{expand, RecurrenceInterpreter};

/// Half-open export window `[start, end)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// From the start of `today` in `tz` to the start of the day `days`
    /// days later.
    pub fn days_from<Tz: TimeZone>(today: NaiveDate, days: u32, tz: &Tz) -> Result<Self, ExportError> {
        let invalid = || ExportError::InvalidWindow { days };
        let last = today
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or_else(invalid)?;

        Ok(Self {
            start: start_of_day(today, tz).ok_or_else(invalid)?,
            end: start_of_day(last, tz).ok_or_else(invalid)?,
        })
    }
}

/// First instant of `date` in `tz`. Where a DST change skips midnight the
/// day begins at the first local time after the gap.
fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    (0..MINUTES_PER_DAY).find_map(|minute| {
        tz.from_local_datetime(&(midnight + TimeDelta::minutes(minute)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Fetches `calendar`, expands recurring events and returns the distinct
/// occurrences inside `window` in chronological order.
pub fn collect_occurrences<S, I>(
    source: &S,
    calendar: &str,
    window: DateWindow,
    interpreter: &I,
) -> Result<Vec<Occurrence>, ExportError>
where
    S: CalendarSource + ?Sized,
    I: RecurrenceInterpreter + ?Sized,
{
    let events = source.fetch_events(calendar, window.start, window.end)?;
    let expanded = expand(&events, window.start, window.end, interpreter)?;
    let occurrences = dedupe_and_sort(expanded);

    info!(
        calendar,
        events = events.len(),
        occurrences = occurrences.len(),
        "collected occurrences"
    );
    Ok(occurrences)
}

pub fn format_calendar_list(names: &[String]) -> String {
    if names.is_empty() {
        return "No calendars found.".to_string();
    }

    std::iter::once("Available calendars:".to_string())
        .chain(names.iter().map(|name| format!("  - {name}")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes the rendered export to `path`, or stdout when there is none.
pub fn emit(rendered: &str, path: Option<&Path>) -> Result<(), ExportError> {
    match path {
        Some(path) => {
            fs::write(path, rendered).map_err(|source| ExportError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            eprintln!("Written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Formats the error and its causes on one line.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut cause = error.source();
    while let Some(inner) = cause {
        message.push_str(&format!(": {inner}"));
        cause = inner.source();
    }
    message
}
