pub mod analysis;
pub mod articles;
pub mod health;
pub mod search;

use crate::errors::{AppError, Result};
use crate::services::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Default page size for list-returning operations
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Default result count for the similarity lookup
pub const DEFAULT_SIMILAR_LIMIT: usize = 5;

/// Hard cap applied to any client-supplied limit
pub const MAX_PAGE_LIMIT: usize = 100;

pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout();
    let max_concurrent = state.config.server.max_concurrent_requests;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/articles",
            post(articles::create_article).get(articles::list_articles),
        )
        .route("/articles/search", get(search::search_articles))
        .route("/articles/by-keywords", post(articles::articles_by_keywords))
        .route("/articles/domain/{domain}", get(articles::articles_by_domain))
        .route("/articles/{id}", get(articles::get_article))
        .route("/articles/{id}/similar", get(articles::similar_articles))
        .route("/articles/{id}/analyze", post(analysis::analyze_article))
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(request_timeout))
                // Shared across service clones, so the cap is process-wide.
                .layer(GlobalConcurrencyLimitLayer::new(max_concurrent))
                .layer(cors),
        )
}

/// Parse a path segment as an article id.
pub(crate) fn parse_article_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::InvalidFormat("article id must be a UUID".to_string()))
}

/// Apply the default and the hard cap to a client-supplied limit.
pub(crate) fn clamp_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).min(MAX_PAGE_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_default_and_cap() {
        assert_eq!(clamp_limit(None, DEFAULT_PAGE_LIMIT), 10);
        assert_eq!(clamp_limit(Some(3), DEFAULT_PAGE_LIMIT), 3);
        assert_eq!(clamp_limit(Some(10_000), DEFAULT_PAGE_LIMIT), MAX_PAGE_LIMIT);
        assert_eq!(clamp_limit(None, DEFAULT_SIMILAR_LIMIT), 5);
    }

    #[test]
    fn article_id_parsing() {
        assert!(parse_article_id("not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_article_id(&id.to_string()).unwrap(), id);
    }
}
