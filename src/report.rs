//! # Report — Rendering a Computation
//!
//! Turns a [`Computation`] into text for the CLI and the export endpoint.
//! Two views, as in the explorer's "Detailed Trace" and "Summary" tabs:
//!
//! - **Trace**: one row per generation step with columns
//!   `n | f[n-3] | f[n-2] | f[n-1] | raw | f[n] mod M`, in generation order.
//! - **Summary**: distinct residues, missing residue(s)
//!   (`None` when every residue appears), modulus.
//!
//! Three formats: aligned plain-text `table`, `json` (same shape as the HTTP
//! response), and `csv` with RFC 4180 quoting.

use anyhow::Result;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::engine::{Computation, TraceEntry};
use crate::summary::Summary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
    Csv,
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(Format::Table),
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            other => anyhow::bail!("unknown format '{}' (expected table, json or csv)", other),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Table => write!(f, "table"),
            Format::Json => write!(f, "json"),
            Format::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Trace,
    Summary,
    All,
}

impl FromStr for View {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(View::Trace),
            "summary" => Ok(View::Summary),
            "all" => Ok(View::All),
            other => anyhow::bail!("unknown view '{}' (expected trace, summary or all)", other),
        }
    }
}

/// Column headers of the trace view for modulus `m`.
pub fn trace_headers(modulus: u64) -> [String; 6] {
    [
        "n".to_string(),
        "f[n-3]".to_string(),
        "f[n-2]".to_string(),
        "f[n-1]".to_string(),
        "raw".to_string(),
        format!("f[n] mod {}", modulus),
    ]
}

fn trace_cells(entry: &TraceEntry) -> [String; 6] {
    [
        entry.index.to_string(),
        entry.a.to_string(),
        entry.b.to_string(),
        entry.c.to_string(),
        entry.raw.to_string(),
        entry.modded.to_string(),
    ]
}

/// Missing residues as shown on the summary card.
pub fn missing_label(summary: &Summary) -> String {
    if summary.missing.is_empty() {
        "None".to_string()
    } else {
        summary
            .missing
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn render(computation: &Computation, format: Format, view: View) -> Result<String> {
    match format {
        Format::Table => Ok(render_table(computation, view)),
        Format::Json => render_json(computation, view),
        Format::Csv => Ok(render_csv(computation, view)),
    }
}

fn render_table(computation: &Computation, view: View) -> String {
    let mut out = String::new();
    if view != View::Summary {
        out.push_str(&trace_table(computation));
    }
    if view == View::All {
        out.push('\n');
    }
    if view != View::Trace {
        out.push_str(&summary_table(&computation.summary));
    }
    out
}

fn trace_table(computation: &Computation) -> String {
    let headers = trace_headers(computation.summary.modulus.get());
    let rows: Vec<[String; 6]> = computation.trace.iter().map(trace_cells).collect();

    let mut widths = headers.clone().map(|h| h.len());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    let line = |out: &mut String, cells: &[String; 6]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{:>w$}", cell, w = w))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  "));
    };
    line(&mut out, &headers);
    let rule: usize = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    let _ = writeln!(out, "{}", "-".repeat(rule));
    for row in &rows {
        line(&mut out, row);
    }
    if rows.is_empty() {
        let _ = writeln!(out, "(no generated terms)");
    }
    out
}

fn summary_table(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Distinct residues   {}", summary.distinct_count);
    let _ = writeln!(out, "Missing residue(s)  {}", missing_label(summary));
    let _ = writeln!(out, "Modulus             {}", summary.modulus);
    out
}

fn render_json(computation: &Computation, view: View) -> Result<String> {
    let body = match view {
        View::Trace => serde_json::to_string_pretty(&computation.trace)?,
        View::Summary => serde_json::to_string_pretty(&computation.summary)?,
        View::All => serde_json::to_string_pretty(computation)?,
    };
    Ok(body)
}

/// Quote a CSV field when it holds a comma, quote or newline.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_line(cells: &[String]) -> String {
    let mut line = cells
        .iter()
        .map(|c| escape_field(c))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn render_csv(computation: &Computation, view: View) -> String {
    let mut out = String::new();
    if view != View::Summary {
        out.push_str(&csv_line(&trace_headers(computation.summary.modulus.get())));
        for entry in &computation.trace {
            out.push_str(&csv_line(&trace_cells(entry)));
        }
    }
    if view == View::All {
        out.push('\n');
    }
    if view != View::Trace {
        let summary = &computation.summary;
        out.push_str("distinct_residues,missing_residues,modulus\n");
        out.push_str(&csv_line(&[
            summary.distinct_count.to_string(),
            missing_label(summary),
            summary.modulus.to_string(),
        ]));
    }
    out
}
