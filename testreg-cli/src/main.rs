//! testreg - builds and inspects test extension registries

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use testreg_core::RegistryFixture;

mod inspect;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "testreg",
    about = "Builds and inspects disposable extension registries for tooling tests",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "info", global = true)]
    log_level: LogLevel,
}

#[derive(Parser, Debug)]
enum Command {
    /// Build the registry tree described by a fixture
    Build {
        /// YAML fixture describing the registries
        #[clap(long)]
        fixture: PathBuf,

        /// Directory to write the tree into (defaults to the user cache directory)
        #[clap(long)]
        base_dir: Option<PathBuf>,
    },

    /// Check a fixture without writing anything
    Validate {
        /// YAML fixture describing the registries
        #[clap(long)]
        fixture: PathBuf,
    },

    /// Summarize a built registry tree
    Inspect {
        /// Directory holding the tree (defaults to the user cache directory)
        #[clap(long)]
        base_dir: Option<PathBuf>,

        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },
}

fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn default_base_dir() -> Result<PathBuf> {
    use directories::ProjectDirs;

    ProjectDirs::from("", "", "testreg")
        .map(|dirs| dirs.cache_dir().join("registry"))
        .ok_or_else(|| anyhow!("Could not determine a cache directory, pass --base-dir"))
}

fn resolve_base_dir(base_dir: Option<PathBuf>) -> Result<PathBuf> {
    match base_dir {
        Some(dir) => Ok(dir),
        None => default_base_dir(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level);
    debug!("Parsed command: {:?}", cli.command);

    match cli.command {
        Command::Build { fixture, base_dir } => {
            let base_dir = resolve_base_dir(base_dir)?;
            let registry_fixture = RegistryFixture::from_file(&fixture)
                .with_context(|| format!("Failed to load fixture {}", fixture.display()))?;
            registry_fixture
                .build_into(&base_dir)
                .with_context(|| format!("Failed to build registries into {}", base_dir.display()))?;

            info!("Built {} registries", registry_fixture.registries.len());
            println!("Registry tree written to {}", base_dir.display());
        }

        Command::Validate { fixture } => {
            let registry_fixture = RegistryFixture::from_file(&fixture)
                .with_context(|| format!("Failed to load fixture {}", fixture.display()))?;
            registry_fixture
                .validate()
                .with_context(|| format!("Fixture {} is invalid", fixture.display()))?;

            println!(
                "Fixture {} is valid ({} registries)",
                fixture.display(),
                registry_fixture.registries.len()
            );
        }

        Command::Inspect { base_dir, json } => {
            let base_dir = resolve_base_dir(base_dir)?;
            let inspection = inspect::inspect(&base_dir)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&inspection)?);
            } else {
                inspect::print_tables(&inspection);
            }
        }
    }

    Ok(())
}
