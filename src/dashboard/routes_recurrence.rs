//! Recurrence endpoints: the engine's request/response call over HTTP.
//!
//! Engine validation failures come back as 400 with `{"error", "kind"}`; a
//! body that is not a valid request JSON comes back as 400 with kind
//! `invalid_request`. No partial trace is ever returned.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::AppState;
use crate::engine::{ComputeRequest, Computation};
use crate::report::{self, Format, View};
use crate::rule::RecurrenceRule;

fn error_response(status: StatusCode, kind: &str, message: String) -> Response {
    (
        status,
        Json(serde_json::json!({"error": message, "kind": kind})),
    )
        .into_response()
}

/// Run one computation off the async runtime and record its outcome.
///
/// A blocking task cannot be cancelled: if the timeout layer answers 408
/// first, the computation still runs to completion and its result is dropped.
/// The engine's `Limits` are what bound that leftover work.
async fn run_compute(
    state: &Arc<AppState>,
    body: Result<Json<ComputeRequest>, JsonRejection>,
) -> Result<Computation, Response> {
    let Json(request) = body.map_err(|rejection| {
        state.prom_metrics.record_outcome("invalid_request");
        error_response(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            rejection.body_text(),
        )
    })?;

    let worker_state = Arc::clone(state);
    let result = tokio::task::spawn_blocking(move || worker_state.engine.compute(&request))
        .await
        .map_err(|e| {
            warn!(error = %e, "computation task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                format!("computation panicked: {}", e),
            )
        })?;

    match result {
        Ok(computation) => {
            state.prom_metrics.record_outcome("ok");
            state
                .prom_metrics
                .terms_generated
                .inc_by(computation.trace.len() as u64);
            info!(
                modulus = computation.summary.modulus.get(),
                steps = computation.trace.len(),
                distinct = computation.summary.distinct_count,
                missing = computation.summary.missing.len(),
                "recurrence computed"
            );
            Ok(computation)
        }
        Err(e) => {
            state.prom_metrics.record_outcome(e.kind());
            info!(kind = e.kind(), error = %e, "recurrence request rejected");
            Err(error_response(StatusCode::BAD_REQUEST, e.kind(), e.to_string()))
        }
    }
}

pub(super) async fn handler_api_recurrence(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ComputeRequest>, JsonRejection>,
) -> Response {
    match run_compute(&state, body).await {
        Ok(computation) => Json(computation).into_response(),
        Err(response) => response,
    }
}

#[derive(Deserialize)]
pub(super) struct ExportQuery {
    format: Option<String>,
}

pub(super) async fn handler_api_recurrence_export(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportQuery>,
    body: Result<Json<ComputeRequest>, JsonRejection>,
) -> Response {
    let format = match params.format.as_deref().unwrap_or("csv").parse::<Format>() {
        Ok(Format::Table) | Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "invalid_format",
                "format must be csv or json".to_string(),
            )
        }
        Ok(f) => f,
    };
    let computation = match run_compute(&state, body).await {
        Ok(c) => c,
        Err(response) => return response,
    };
    let rendered = match report::render(&computation, format, View::All) {
        Ok(body) => body,
        Err(e) => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string())
        }
    };
    let (content_type, disposition) = match format {
        Format::Json => ("application/json", "attachment; filename=\"recurrence.json\""),
        _ => ("text/csv; charset=utf-8", "attachment; filename=\"recurrence.csv\""),
    };
    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        rendered,
    )
        .into_response()
}

pub(super) async fn handler_api_defaults(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let defaults = &state.config.defaults;
    let limits = state.engine.limits();
    Json(serde_json::json!({
        "defaults": {
            "modulus": defaults.modulus,
            "termCount": defaults.terms,
            "initialTerms": defaults.initial_terms,
        },
        "limits": {
            "maxTerms": limits.max_terms,
            "maxModulus": limits.max_modulus,
        },
        "rule": state.engine.rule().formula(),
    }))
}
