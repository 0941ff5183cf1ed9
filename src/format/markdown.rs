use chrono::{DateTime, TimeZone};
use regex_lite::Regex;
use std::fmt::Display;
use std::sync::LazyLock;

use crate::calendar::events::{EventStatus, Occurrence};

const NO_EVENTS: &str = "_No events found._";

/// Conference boilerplate calendar providers paste into event notes.
static BOILERPLATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?s)-::~:~::.*?::~:~::-",
        r"(?is)Join with Google Meet:.*?Please do not edit this section\.",
        r"https://meet\.google\.com/\S+",
        r"Or dial:.*?#",
        r"(?m)More phone numbers:.*$",
        r"(?m)Learn more about Meet at:.*$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid boilerplate pattern"))
    .collect()
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Renders occurrences as Markdown, one `##` section per day of `tz`.
pub fn format_markdown<Tz>(occurrences: &[Occurrence], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if occurrences.is_empty() {
        return NO_EVENTS.to_string();
    }

    let mut lines = Vec::new();
    for (header, day) in group_by_date(occurrences, tz) {
        lines.push(format!("## {header}"));
        lines.push(String::new());

        for occ in day {
            lines.push(format!("- **{}** {}", format_time_range(occ, tz), occ.title));

            if let Some(location) = &occ.location {
                lines.push(format!("  - Location: {location}"));
            }
            if let Some(notes) = occ.description.as_deref().map(clean_description) {
                if !notes.is_empty() {
                    lines.push(format!("  - Notes: {notes}"));
                }
            }
            if let Some(url) = &occ.url {
                lines.push(format!("  - URL: {url}"));
            }
            if let Some(attendees) = occ.attendees.as_ref().filter(|a| !a.is_empty()) {
                lines.push(format!("  - Attendees: {}", attendees.join(", ")));
            }
            if let Some(status) = occ.status.filter(|s| *s != EventStatus::Confirmed) {
                lines.push(format!("  - Status: {}", status.as_str()));
            }
        }

        lines.push(String::new());
    }

    lines.join("\n").trim_end().to_string()
}

/// Groups by calendar day, in order of first appearance.
fn group_by_date<'a, Tz>(occurrences: &'a [Occurrence], tz: &Tz) -> Vec<(String, Vec<&'a Occurrence>)>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut groups: Vec<(String, Vec<&Occurrence>)> = Vec::new();

    for occ in occurrences {
        let header = format_date_header(&occ.start.with_timezone(tz));
        match groups.iter_mut().find(|(key, _)| *key == header) {
            Some((_, day)) => day.push(occ),
            None => groups.push((header, vec![occ])),
        }
    }

    groups
}

fn format_date_header<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.format("%A, %B %-d, %Y").to_string()
}

fn format_time_range<Tz>(occ: &Occurrence, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if occ.all_day {
        return "All Day".to_string();
    }

    format!(
        "{} - {}",
        format_time(&occ.start.with_timezone(tz)),
        format_time(&occ.end.with_timezone(tz))
    )
}

pub fn format_time<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.format("%-I:%M %p").to_string()
}

/// Strips conferencing boilerplate and folds the rest onto one line.
pub fn clean_description(description: &str) -> String {
    let cleaned = BOILERPLATE
        .iter()
        .fold(description.to_string(), |text, re| re.replace_all(&text, "").into_owned());

    WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
}
