//! verstamp - report build and version metadata

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

use verstamp_core::prelude::*;
use verstamp_tools::report;
use verstamp_tools::{init_logging, GlobalConfig, ReportConfig, SourceArgs};

/// Build and version metadata reporter
#[derive(Parser)]
#[command(name = "verstamp")]
#[command(about = "Report build and version metadata as deterministic JSON")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the indented version report
    Version(VersionArgs),
    /// Print the compact JSON encoding
    Compact(SourceArgs),
    /// Print a human-readable summary of the main version
    Summary(SourceArgs),
    /// Print the environment variable name for an executable
    EnvName {
        /// Executable path (defaults to this process)
        #[arg(long)]
        exe: Option<PathBuf>,
    },
    /// Print NAME=VALUE storing the configured version
    EnvEncode(SourceArgs),
    /// Decode an environment payload and print it indented
    EnvDecode {
        /// Encoded payload
        value: String,

        /// Indentation unit
        #[arg(long, default_value = "  ")]
        indent: String,
    },
}

#[derive(Args)]
struct VersionArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Do not include the version inherited through the environment
    #[arg(long)]
    no_env: bool,
}

fn load(source: SourceArgs) -> Result<ReportConfig> {
    let config = ReportConfig::load(source.config.as_ref())?;
    Ok(config.with_overrides(source.indent, source.prefix))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.global);

    let key = EnvKey::current();
    debug!("Environment key: {}", key.name());

    let output = match cli.command {
        Commands::Version(args) => {
            let config = load(args.source)?;
            info!("Rendering version report");
            report::render_version(&config, &key, !args.no_env)?
        }
        Commands::Compact(source) => format!("{}\n", report::render_compact(&load(source)?)?),
        Commands::Summary(source) => {
            let summary = report::render_summary(&load(source)?);
            format!("{}\n", summary.trim_start_matches('\n'))
        }
        Commands::EnvName { exe } => {
            let key = exe.map(|path| EnvKey::for_executable(path)).unwrap_or(key);
            format!("{}\n", key.name())
        }
        Commands::EnvEncode(source) => {
            format!("{}\n", report::render_env_assignment(&load(source)?, &key)?)
        }
        Commands::EnvDecode { value, indent } => report::render_env_value(&value, "", &indent)?,
    };

    std::io::stdout().write_all(output.as_bytes())?;
    Ok(())
}
