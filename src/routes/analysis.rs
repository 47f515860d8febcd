//! Content analysis handler.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::parse_article_id;
use crate::errors::Result;
use crate::model::{Article, Entity};
use crate::services::AppState;

/// Semantic analysis view of one article.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub id: Uuid,
    pub extracted_keywords: Vec<String>,
    pub entities: Vec<Entity>,
    pub term_frequencies: BTreeMap<String, u32>,
    pub related_domains: Vec<String>,
    pub readability_score: f64,
}

impl From<Article> for AnalysisResponse {
    fn from(article: Article) -> Self {
        let semantic = article.semantic_data;
        Self {
            id: article.id,
            extracted_keywords: semantic.extracted_keywords,
            entities: semantic.entities,
            term_frequencies: semantic.term_frequency,
            related_domains: semantic.related_domains,
            readability_score: semantic.readability_score,
        }
    }
}

/// Return the article's semantic analysis, running enrichment synchronously
/// only when it has never been analyzed. A prior analysis is returned as-is.
pub async fn analyze_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisResponse>> {
    let id = parse_article_id(&id)?;
    let article = state.store.get_by_id(id).await?;
    let article = if article.semantic_data.analyzed_at.is_none() {
        state.enrich.enrich(id).await?
    } else {
        article
    };
    Ok(Json(article.into()))
}
