//! Command-line interface definition.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use eventscout_core::{LogFormat, LogSettings};

/// eventscout - speaking and event opportunities from six providers at once
#[derive(Debug, Parser)]
#[command(name = "eventscout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "EVENTSCOUT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format written to stderr (text or json)
    #[arg(long, env = "EVENTSCOUT_LOG_FORMAT", default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Log filter directive, overriding -v (e.g. "eventscout_search=debug")
    #[arg(long, env = "RUST_LOG", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Log settings from the verbosity and log flags.
    pub fn log_settings(&self) -> LogSettings {
        LogSettings::new(self.verbose)
            .with_format(self.log_format)
            .with_filter(self.log_filter.clone())
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search every provider for events
    Search(SearchArgs),

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of the `search` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SearchArgs {
    /// Topic to search for (e.g. "AI")
    #[arg(long, short, default_value = "")]
    pub topic: String,

    /// Industry to search in (e.g. "Technology")
    #[arg(long, short, default_value = "")]
    pub industry: String,

    /// Your name, carried along with the request
    #[arg(long, default_value = "")]
    pub name: String,

    /// Your email, carried along with the request
    #[arg(long, default_value = "")]
    pub email: String,

    /// Number of load-more pages to show after the top events
    #[arg(long, short, default_value_t = 1)]
    pub pages: usize,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
