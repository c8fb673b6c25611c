//! Log setup for the eventscout binary.
//!
//! Logs always go to stderr so that search results on stdout stay clean,
//! including `--json` output piped into other tools.
//!
//! ```ignore
//! use eventscout_core::tracing::{LogFormat, LogSettings, init_tracing};
//!
//! init_tracing(&LogSettings::new(1).with_format(LogFormat::Json))?;
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, Layer, fmt as tfmt, prelude::*};

/// Target prefix shared by every eventscout crate.
const TARGET_PREFIX: &str = "eventscout";

/// Errors from log setup.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("unknown log format {0:?}, expected \"text\" or \"json\"")]
    UnknownFormat(String),
}

/// How log lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One compact human-readable line per event.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(TracingError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

/// Log settings derived from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Number of `-v` flags.
    pub verbosity: u8,
    pub format: LogFormat,
    /// Filter directive that replaces the verbosity-derived one.
    pub filter: Option<String>,
}

impl LogSettings {
    /// Settings for a `-v` count, text output and no filter override.
    pub fn new(verbosity: u8) -> Self {
        Self {
            verbosity,
            format: LogFormat::Text,
            filter: None,
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Replaces the verbosity-derived filter; blank directives are ignored.
    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter.filter(|f| !f.trim().is_empty());
        self
    }

    /// Level for eventscout targets: warn, then info, debug and trace per `-v`.
    pub fn level(&self) -> Level {
        match self.verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    /// The filter directive in effect.
    pub fn directive(&self) -> String {
        match self.filter {
            Some(ref filter) => filter.clone(),
            None => format!("{}={}", TARGET_PREFIX, self.level()),
        }
    }

    /// Builds the env filter for [`directive`](Self::directive).
    pub fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        Ok(EnvFilter::try_new(self.directive())?)
    }
}

/// Installs the global subscriber. Call once, at startup.
///
/// # Errors
///
/// Fails if a subscriber is already installed or the filter does not parse.
pub fn init_tracing(settings: &LogSettings) -> Result<(), TracingError> {
    let env_filter = settings.env_filter()?;
    let with_location = settings.verbosity >= 2;

    let layer = match settings.format {
        LogFormat::Text => tfmt::layer()
            .compact()
            .without_time()
            .with_target(settings.verbosity >= 1)
            .with_file(with_location)
            .with_line_number(with_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => tfmt::layer()
            .json()
            .with_current_span(true)
            .with_file(with_location)
            .with_line_number(with_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(LogSettings::new(0).level(), Level::WARN);
        assert_eq!(LogSettings::new(1).level(), Level::INFO);
        assert_eq!(LogSettings::new(2).level(), Level::DEBUG);
        assert_eq!(LogSettings::new(7).level(), Level::TRACE);
    }

    #[test]
    fn directive_follows_verbosity_unless_overridden() {
        assert_eq!(LogSettings::new(0).directive(), "eventscout=WARN");
        assert_eq!(LogSettings::new(2).directive(), "eventscout=DEBUG");

        let settings = LogSettings::new(0).with_filter(Some("eventscout_search=trace".to_string()));
        assert_eq!(settings.directive(), "eventscout_search=trace");

        let settings = LogSettings::new(1).with_filter(Some("  ".to_string()));
        assert!(settings.filter.is_none());
        assert_eq!(settings.directive(), "eventscout=INFO");
    }

    #[test]
    fn env_filter_rejects_bad_directive() {
        assert!(LogSettings::new(1).env_filter().is_ok());
        let settings = LogSettings::new(1).with_filter(Some("eventscout=loud".to_string()));
        assert!(matches!(settings.env_filter(), Err(TracingError::Filter(_))));
    }

    #[test]
    fn format_names() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!(" JSON ".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!(matches!(
            "pretty".parse::<LogFormat>(),
            Err(TracingError::UnknownFormat(_))
        ));
        assert_eq!(LogFormat::Json.to_string(), "json");
        assert_eq!(LogSettings::new(0).with_format(LogFormat::Json).format, LogFormat::Json);
    }
}
