//! # Main — CLI Entry Point
//!
//! Routes subcommands to the engine and the HTTP service.
//!
//! ## Subcommands
//!
//! - `compute`: evaluate one recurrence request and print the trace and/or
//!   summary as a table, JSON or CSV. Flags left out fall back to the
//!   `[defaults]` section of the configuration.
//! - `serve`: start the HTTP service (`POST /api/recurrence`).
//!
//! ## Global Options
//!
//! - `--config` / `RECURRENCE_CONFIG`: TOML configuration file.
//! - `LOG_FORMAT=json`: structured JSON logs; human-readable on stderr otherwise.
//! - `RUST_LOG`: log filter (default `info`).

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use recurrence_explorer::report::{Format, View};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "recurrence",
    about = "Explore three-term integer recurrences modulo M"
)]
struct Cli {
    /// Path to a TOML configuration file (defaults, limits, server settings)
    #[arg(long, env = "RECURRENCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a sequence and print its trace and residue summary
    Compute {
        /// Modulus M (at least 2)
        #[arg(long, allow_negative_numbers = true)]
        modulus: Option<i64>,
        /// Number of terms in the final sequence, seed included
        #[arg(long, allow_negative_numbers = true)]
        terms: Option<i64>,
        /// Initial terms, comma-separated (e.g. "1,2,3")
        #[arg(long, allow_hyphen_values = true)]
        initial: Option<String>,
        /// Output format: table, json or csv
        #[arg(long, default_value = "table")]
        format: Format,
        /// What to print: trace, summary or all
        #[arg(long, default_value = "all")]
        view: View,
        /// Write the report to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Serve the engine over HTTP
    Serve {
        /// Port to listen on (overrides server.port from the configuration)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // LOG_FORMAT=json for log shippers, human-readable otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let config = recurrence_explorer::config::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Compute {
            modulus,
            terms,
            initial,
            format,
            view,
            output,
        } => cli::run_compute(
            &config,
            cli::ComputeArgs {
                modulus: *modulus,
                terms: *terms,
                initial: initial.clone(),
                format: *format,
                view: *view,
                output: output.clone(),
            },
        ),
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(recurrence_explorer::dashboard::run(config, port))
        }
    }
}
