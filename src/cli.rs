//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim: turns the `compute`
//! flags into one engine request, fills gaps from the configuration, and
//! writes the rendered report.

use anyhow::Result;
use recurrence_explorer::config::AppConfig;
use recurrence_explorer::report::{self, Format, View};
use recurrence_explorer::{ComputeRequest, Engine};
use std::path::PathBuf;
use tracing::{debug, info};

pub struct ComputeArgs {
    pub modulus: Option<i64>,
    pub terms: Option<i64>,
    pub initial: Option<String>,
    pub format: Format,
    pub view: View,
    pub output: Option<PathBuf>,
}

/// Build the request from the flags, falling back to `[defaults]`.
fn request_from(config: &AppConfig, args: &ComputeArgs) -> ComputeRequest {
    let defaults = &config.defaults;
    ComputeRequest {
        modulus: args.modulus.unwrap_or(defaults.modulus),
        term_count: args.terms.unwrap_or(defaults.terms),
        initial_terms: args
            .initial
            .as_deref()
            .unwrap_or(&defaults.initial_terms)
            .into(),
    }
}

pub fn run_compute(config: &AppConfig, args: ComputeArgs) -> Result<()> {
    let request = request_from(config, &args);
    debug!(?request, "compute request");

    let engine = Engine::new().with_limits(config.limits());
    let computation = engine.compute(&request)?;
    let rendered = report::render(&computation, args.format, args.view)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            info!(
                path = %path.display(),
                format = %args.format,
                steps = computation.trace.len(),
                "report written"
            );
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
