//! Full-text search handler.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::articles::PageResponse;
use super::{clamp_limit, DEFAULT_PAGE_LIMIT};
use crate::errors::{AppError, Result};
use crate::events::{publish_detached, ArticleEvent};
use crate::services::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Relevance-ranked search across title, abstract, keywords and content.
/// Emits a searched event carrying the query and returned result count.
pub async fn search_articles(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<PageResponse>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(AppError::Validation(
            "the search query is required".to_string(),
        ));
    }

    let page = state
        .store
        .search(
            query,
            clamp_limit(params.limit, DEFAULT_PAGE_LIMIT),
            params.offset.unwrap_or(0),
        )
        .await?;
    metrics::counter!("article_search_queries_total").increment(1);

    publish_detached(
        state.events.clone(),
        ArticleEvent::searched(query, page.articles.len()),
    );
    Ok(Json(page.into()))
}
