//! CLI entry point for the docdrop daemon.
//!
//! Watches one or more input directories for dropped data and template files
//! and generates a document for each matched pair.
//!
//! # Usage
//!
//! ```bash
//! docdrop [OPTIONS] <COMMAND>
//!
//! # Watch the configured directories until Ctrl-C
//! docdrop --config docdrop.json run
//!
//! # Override the generator and stability window
//! docdrop run --generator /usr/local/bin/render --stability-ms 5000
//!
//! # Show the effective configuration
//! docdrop config
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use dd_core::Config;
use dd_watcher::{CommandGenerator, GenerateError, WatcherSupervisor};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Directory-drop document generator.
///
/// Drop `name.txt` and `name.docx` (or `.pptx`, `.xlsx`) into a watched
/// input directory; once both stop changing, `name.docx` is generated in the
/// matching output directory.
#[derive(Parser)]
#[command(name = "docdrop", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON configuration file.
    ///
    /// Built-in defaults are used if not specified.
    #[arg(short, long, global = true, env = "DOCDROP_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Watch the configured directories until interrupted.
    Run {
        /// Milliseconds a file must stay unmodified before it is matched.
        #[arg(long)]
        stability_ms: Option<u64>,

        /// Milliseconds between sweeps when no events arrive.
        #[arg(long)]
        poll_ms: Option<u64>,

        /// Generator program (overrides the configuration file).
        #[arg(long)]
        generator: Option<String>,
    },

    /// Print the effective configuration as JSON.
    Config,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},mio=warn,notify=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Loads the configuration file, or the defaults, and applies overrides from
/// the `run` subcommand.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the result is invalid.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("Failed to load configuration from {path}"))?,
        None => Config::default(),
    };

    if let Commands::Run {
        stability_ms,
        poll_ms,
        generator,
    } = &cli.command
    {
        if let Some(ms) = stability_ms {
            config.watch.stability_ms = *ms;
        }
        if let Some(ms) = poll_ms {
            config.watch.poll_interval_ms = *ms;
        }
        if generator.is_some() {
            config.generator.program.clone_from(generator);
        }
    }

    config.validate().wrap_err("Invalid configuration")?;
    Ok(config)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs the supervisor until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if no generator is configured or no engine starts.
async fn run_watch(config: Config) -> color_eyre::Result<()> {
    let generator = CommandGenerator::from_config(&config.generator).map_err(|e| match e {
        GenerateError::NotConfigured => {
            eyre!("No generator program configured; set generator.program or pass --generator")
        }
        other => eyre!(other),
    })?;

    let mut supervisor = WatcherSupervisor::new(&config, Arc::new(generator));
    let report = supervisor.start();

    if report.started.is_empty() {
        return Err(eyre!("No watch directory could be started"));
    }
    for (target, error) in &report.failed {
        warn!(input = %target.input, error = %error, "Directory not watched");
    }
    for target in supervisor.targets() {
        info!(input = %target.input, output = %target.output, "Watching");
    }

    wait_for_shutdown().await?;

    info!("Shutting down");
    supervisor.stop();
    supervisor.await_all().await;
    Ok(())
}

/// Waits for Ctrl-C, or SIGTERM on Unix.
async fn wait_for_shutdown() -> color_eyre::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => info!("Received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}

/// Prints the effective configuration.
fn run_config(config: &Config) -> color_eyre::Result<()> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| eyre!("Failed to serialize configuration: {}", e))?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{json}")?;
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Load configuration and route to the command
    let config = build_config(&cli)?;
    match cli.command {
        Commands::Run { .. } => run_watch(config).await,
        Commands::Config => run_config(&config),
    }
}
