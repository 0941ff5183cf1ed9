use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global subscriber. Logs go to stderr so stdout carries
/// only the export.
pub fn init_logging(verbosity: u8, configured: Option<&str>) -> Result<(), SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity, configured)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

fn default_directive(verbosity: u8, configured: Option<&str>) -> &str {
    match verbosity {
        0 => configured.unwrap_or("warn"),
        1 => "info",
        _ => "debug",
    }
}
