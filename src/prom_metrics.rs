//! # Prometheus Metrics — Exposition for the Recurrence Service
//!
//! Exposes service metrics in the Prometheus text exposition format for
//! scraping by Prometheus, Grafana Agent, or any OpenMetrics-compatible collector.
//!
//! ## Metrics Exposed
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `recurrence_computations_total` | Counter | `outcome` | Requests by result (`ok` or an error kind) |
//! | `recurrence_terms_generated_total` | Counter | — | Trace entries produced |
//! | `recurrence_http_request_duration_seconds` | Histogram | `method`, `path` | Request latency |
//!
//! The `/metrics` endpoint renders the current registry state on each scrape.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

/// Label set for per-outcome computation counts.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OutcomeLabel {
    pub outcome: String,
}

/// Label set for HTTP latency, with the path already normalized.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabel {
    pub method: String,
    pub path: String,
}

type HistogramFamily = Family<HttpLabel, Histogram, fn() -> Histogram>;

fn latency_histogram() -> Histogram {
    // 1ms .. ~4s
    Histogram::new(exponential_buckets(0.001, 2.0, 12))
}

/// Thread-safe metrics registry for the recurrence service.
///
/// All metric handles are atomic and safe to update from any async task.
pub struct Metrics {
    pub registry: Registry,
    pub computations: Family<OutcomeLabel, Counter>,
    pub terms_generated: Counter,
    pub http_request_duration: HistogramFamily,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let computations = Family::<OutcomeLabel, Counter>::default();
        registry.register(
            "recurrence_computations",
            "Recurrence requests by outcome",
            computations.clone(),
        );

        let terms_generated = Counter::default();
        registry.register(
            "recurrence_terms_generated",
            "Trace entries produced across all requests",
            terms_generated.clone(),
        );

        let http_request_duration: HistogramFamily =
            Family::new_with_constructor(latency_histogram);
        registry.register(
            "recurrence_http_request_duration_seconds",
            "HTTP request latency in seconds",
            http_request_duration.clone(),
        );

        Self {
            registry,
            computations,
            terms_generated,
            http_request_duration,
        }
    }

    /// Count one request under `outcome`.
    pub fn record_outcome(&self, outcome: &str) {
        self.computations
            .get_or_create(&OutcomeLabel {
                outcome: outcome.to_string(),
            })
            .inc();
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut buf = String::new();
        if let Err(e) = encode(&mut buf, &self.registry) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        buf
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
