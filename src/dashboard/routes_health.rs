//! Probe and scrape endpoints for the recurrence service.
//!
//! `/healthz` answers as long as the process serves HTTP. `/readyz` also
//! names the active rule, which is the only thing the service needs before it
//! can compute. `/metrics` renders the registry in OpenMetrics text.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use std::sync::Arc;

use super::AppState;
use crate::rule::RecurrenceRule;

const OPENMETRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

pub(super) async fn handler_healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(super) async fn handler_readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let formula = state.engine.rule().formula();
    (StatusCode::OK, format!("ok: {formula}"))
}

pub(super) async fn handler_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)],
        state.prom_metrics.encode(),
    )
}
