use calexport::args::{Cli, Request};
use calexport::calendar::open_source;
use calexport::config::Config;
use calexport::export::{self, DateWindow};
use calexport::logging::init_logging;
use calexport::{ExportError, RRuleInterpreter};
use chrono::Local;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", export::error_chain(&e));
        if let Some(hint) = e.hint() {
            eprintln!("{hint}");
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ExportError> {
    let config = Config::load(cli.config.as_deref())?;
    if let Err(e) = init_logging(cli.verbose, config.log_level.as_deref()) {
        eprintln!("Warning: logging unavailable - {e}");
    }

    let source_path = cli.source.clone();
    let request = cli.into_request(&config)?;
    let source = open_source(source_path.as_deref())?;

    match request {
        Request::ListCalendars => {
            println!("{}", export::format_calendar_list(&source.list_calendars()?));
        }
        Request::Export(options) => {
            let window = DateWindow::days_from(Local::now().date_naive(), options.days, &Local)?;
            tracing::debug!(start = %window.start, end = %window.end, "export window");

            let occurrences =
                export::collect_occurrences(&*source, &options.calendar, window, &RRuleInterpreter)?;
            let rendered = options.output.render(&occurrences, &Local)?;
            export::emit(&rendered, options.file.as_deref())?;
        }
    }

    Ok(())
}
