//! Shared test helpers for integration tests.

#![allow(dead_code)]

use recurrence_explorer::config::AppConfig;
use recurrence_explorer::dashboard::{build_router, AppState};
use rug::Integer;

/// Build an Axum test app router with the default configuration.
pub fn build_test_app() -> axum::Router {
    build_router(AppState::new(AppConfig::default()))
}

/// Build an Axum test app router with a custom configuration.
pub fn build_test_app_with(config: AppConfig) -> axum::Router {
    build_router(AppState::new(config))
}

pub fn ints(values: &[i64]) -> Vec<Integer> {
    values.iter().map(|&v| Integer::from(v)).collect()
}
