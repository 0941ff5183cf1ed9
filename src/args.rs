use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::ExportError;
use crate::format::OutputFormat;

pub const DEFAULT_DAYS: u32 = 7;

#[derive(Parser, Debug)]
#[command(name = "calexport")]
#[command(about = "Export calendar events to JSON or Markdown", long_about = None)]
pub struct Cli {
    /// Calendar name
    #[arg(short, long)]
    pub calendar: Option<String>,

    /// Days to export including today [default: 7]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub days: Option<u32>,

    /// Output format [default: json]
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Write to file instead of stdout
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// List available calendar names
    #[arg(short, long)]
    pub list_calendars: bool,

    /// Read events from a JSON export instead of the system calendar
    #[arg(long, value_name = "FILE")]
    pub source: Option<PathBuf>,

    /// Config file [default: <config dir>/calexport/config.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// What a run should do once flags and config are merged.
#[derive(Debug, PartialEq)]
pub enum Request {
    ListCalendars,
    Export(ExportOptions),
}

#[derive(Debug, PartialEq)]
pub struct ExportOptions {
    pub calendar: String,
    pub days: u32,
    pub output: OutputFormat,
    pub file: Option<PathBuf>,
}

impl Cli {
    pub fn into_request(self, config: &Config) -> Result<Request, ExportError> {
        if self.list_calendars {
            return Ok(Request::ListCalendars);
        }

        let calendar = self
            .calendar
            .or_else(|| config.calendar.clone())
            .filter(|c| !c.is_empty())
            .ok_or(ExportError::MissingCalendar)?;

        let days = self.days.or(config.days).unwrap_or(DEFAULT_DAYS);
        if days < 1 {
            return Err(ExportError::InvalidDays);
        }

        Ok(Request::Export(ExportOptions {
            calendar,
            days,
            output: self.output.or(config.output).unwrap_or_default(),
            file: self.file,
        }))
    }
}
