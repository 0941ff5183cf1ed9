pub mod json;
pub mod markdown;

use chrono::TimeZone;
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt::Display;

use crate::calendar::events::Occurrence;

pub use json::format_json;
pub use markdown::format_markdown;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    #[value(name = "md")]
    #[serde(rename = "md")]
    Markdown,
}

impl OutputFormat {
    /// Renders `occurrences` in this format. Wall-clock times in Markdown
    /// use `tz`; JSON is always UTC.
    pub fn render<Tz>(self, occurrences: &[Occurrence], tz: &Tz) -> serde_json::Result<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match self {
            Self::Json => format_json(occurrences),
            Self::Markdown => Ok(format_markdown(occurrences, tz)),
        }
    }
}
