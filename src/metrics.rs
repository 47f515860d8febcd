//! Prometheus metrics registration and export.

use axum::routing::get;
use axum::Router;
use metrics::{describe_counter, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Register descriptions for every counter this service emits.
pub fn register_metrics() {
    describe_counter!(
        "articles_created_total",
        Unit::Count,
        "Articles successfully persisted"
    );
    describe_counter!(
        "article_views_total",
        Unit::Count,
        "Successful article view-reads"
    );
    describe_counter!(
        "article_search_queries_total",
        Unit::Count,
        "Full-text search queries served"
    );
    describe_counter!(
        "article_enrichment_runs_total",
        Unit::Count,
        "Completed enrichment runs"
    );
    describe_counter!(
        "article_enrichment_failures_total",
        Unit::Count,
        "Detached enrichment runs that failed"
    );
    describe_counter!(
        "article_events_published_total",
        Unit::Count,
        "Domain events handed to the bus"
    );
    describe_counter!(
        "article_events_failed_total",
        Unit::Count,
        "Domain events dropped after a publish failure"
    );
}

/// Router exposing the scrape endpoint.
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    )
}
