//! Article CRUD, lookup and similarity handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{clamp_limit, parse_article_id, DEFAULT_PAGE_LIMIT, DEFAULT_SIMILAR_LIMIT};
use crate::errors::{AppError, Result};
use crate::events::{publish_detached, ArticleEvent};
use crate::model::{Article, ArticleDraft, ArticleMetadata};
use crate::services::AppState;
use crate::store::{ListQuery, Page, SortField};

/// A page of articles plus the total matching count for caller-side paging.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub articles: Vec<Article>,
    pub total_count: usize,
}

impl From<Page> for PageResponse {
    fn from(page: Page) -> Self {
        Self {
            articles: page.articles,
            total_count: page.total_count,
        }
    }
}

/// Request body for creating an article. Required fields are modeled as
/// options so a missing field produces our InvalidArgument shape instead of
/// a body-deserialization rejection.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,

    #[serde(rename = "abstract")]
    #[validate(length(min = 1))]
    pub abstract_text: Option<String>,

    pub authors: Option<Vec<String>>,

    #[validate(length(min = 1, max = 100))]
    pub domain: Option<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    pub publication_date: Option<DateTime<Utc>>,

    #[validate(length(min = 1))]
    pub content: Option<String>,

    pub url: Option<String>,

    pub metadata: Option<MetadataInput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataInput {
    #[serde(default)]
    pub citations: u32,
    #[serde(default)]
    pub references: Vec<String>,
    pub doi: Option<String>,
    pub journal: Option<String>,
}

impl CreateArticleRequest {
    fn into_draft(self) -> Result<ArticleDraft> {
        let authors: Vec<String> = self
            .authors
            .unwrap_or_default()
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if authors.is_empty() {
            return Err(AppError::MissingField("authors".to_string()));
        }

        let keywords = self
            .keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        let metadata = self.metadata.unwrap_or_default();

        Ok(ArticleDraft {
            title: required_text("title", self.title)?,
            abstract_text: required_text("abstract", self.abstract_text)?,
            authors,
            domain: required_text("domain", self.domain)?,
            keywords,
            publication_date: self.publication_date,
            content: required_text("content", self.content)?,
            url: self.url.filter(|u| !u.trim().is_empty()),
            metadata: ArticleMetadata {
                citations: metadata.citations,
                references: metadata.references,
                doi: metadata.doi,
                journal: metadata.journal,
                view_count: 0,
            },
        })
    }
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::MissingField(field.to_string())),
    }
}

/// Create a new article. The store write completes before enrichment and the
/// created event are scheduled; neither delays the response.
pub async fn create_article(
    State(state): State<AppState>,
    Json(request): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<Article>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let draft = request.into_draft()?;

    let article = state.store.create(draft).await?;
    metrics::counter!("articles_created_total").increment(1);

    publish_detached(state.events.clone(), ArticleEvent::created(&article));
    state.enrich.enrich_detached(article.id);

    tracing::info!(
        article_id = %article.id,
        domain = %article.domain,
        "article created"
    );
    Ok((StatusCode::CREATED, Json(article)))
}

/// Get one article by id. Counts the view atomically and emits a viewed
/// event without blocking the response.
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Article>> {
    let id = parse_article_id(&id)?;
    let article = state.store.increment_view_count(id).await?;
    metrics::counter!("article_views_total").increment(1);

    publish_detached(state.events.clone(), ArticleEvent::viewed(&article));
    Ok(Json(article))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_by: Option<SortField>,
    pub descending: Option<bool>,
}

/// List active articles, newest first by default.
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResponse>> {
    let page = state
        .store
        .list(ListQuery {
            limit: clamp_limit(params.limit, DEFAULT_PAGE_LIMIT),
            offset: params.offset.unwrap_or(0),
            sort_by: params.sort_by.unwrap_or(SortField::CreatedAt),
            descending: params.descending.unwrap_or(true),
        })
        .await?;
    Ok(Json(page.into()))
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn articles_by_domain(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<PageResponse>> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(AppError::MissingField("domain".to_string()));
    }
    let page = state
        .store
        .find_by_domain(
            domain,
            clamp_limit(params.limit, DEFAULT_PAGE_LIMIT),
            params.offset.unwrap_or(0),
        )
        .await?;
    Ok(Json(page.into()))
}

#[derive(Debug, Deserialize)]
pub struct KeywordsRequest {
    #[serde(default)]
    pub keywords: Vec<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn articles_by_keywords(
    State(state): State<AppState>,
    Json(request): Json<KeywordsRequest>,
) -> Result<Json<PageResponse>> {
    let keywords: Vec<String> = request
        .keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return Err(AppError::Validation(
            "at least one keyword is required".to_string(),
        ));
    }
    let page = state
        .store
        .find_by_keywords(
            &keywords,
            clamp_limit(request.limit, DEFAULT_PAGE_LIMIT),
            request.offset.unwrap_or(0),
        )
        .await?;
    Ok(Json(page.into()))
}

#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    pub limit: Option<usize>,
}

/// Articles sharing the source's domain or at least one keyword.
pub async fn similar_articles(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SimilarParams>,
) -> Result<Json<PageResponse>> {
    let id = parse_article_id(&id)?;
    let articles = state
        .store
        .find_similar(id, clamp_limit(params.limit, DEFAULT_SIMILAR_LIMIT))
        .await?;
    let total_count = articles.len();
    Ok(Json(PageResponse {
        articles,
        total_count,
    }))
}
