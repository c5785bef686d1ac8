//! Logging.

use snafu::{ResultExt as _, Snafu};
use tracing_subscriber::{
    filter::ParseError, layer::SubscriberExt as _, util::SubscriberInitExt as _, util::TryInitError, Layer as _,
    Registry,
};

mod config;
pub use self::config::{LogLevel, LoggingConfiguration};

mod layer;
use self::layer::build_formatting_layer;

/// A logging error.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum LoggingError {
    /// The logging subsystem was already initialized.
    #[snafu(display("Logging subsystem was already initialized: {}", source))]
    AlreadyInitialized {
        /// Error source.
        source: TryInitError,
    },

    /// Log level was empty.
    #[snafu(display("Log level cannot be empty."))]
    EmptyLogLevel,

    /// Log level was not a valid set of filtering directives.
    #[snafu(display("Failed to parse log level '{}': {}", level, source))]
    InvalidLogLevel {
        /// The log level as given.
        level: String,

        /// Error source.
        source: ParseError,
    },
}

/// Initializes the logging subsystem for `tracing`.
///
/// Events are filtered with the configured log level directives, and written to standard output either in a rich,
/// human-readable format, or as JSON if `log_format_json` is set.
///
/// # Errors
///
/// If the logging subsystem was already initialized, an error will be returned.
pub fn initialize_logging(config: &LoggingConfiguration) -> Result<(), LoggingError> {
    let formatting_layer = build_formatting_layer::<Registry, _>(config, std::io::stdout);

    tracing_subscriber::registry()
        .with(formatting_layer.with_filter(config.log_level.as_env_filter()))
        .try_init()
        .context(AlreadyInitialized)
}
