//! Common options and logging setup for the tool

use clap::Args;
use std::path::PathBuf;

/// Global options shared by every subcommand
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalConfig {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalConfig {
    /// Log level selected by the flags
    pub fn log_level(&self) -> tracing::Level {
        if self.debug {
            tracing::Level::DEBUG
        } else if self.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

/// Options selecting the report source and layout
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Configuration file (JSON or TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Indentation unit
    #[arg(long)]
    pub indent: Option<String>,

    /// Prefix for every line but the first
    #[arg(long)]
    pub prefix: Option<String>,
}

/// Initialize logging on stderr so stdout only carries reports
pub fn init_logging(config: &GlobalConfig) {
    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
