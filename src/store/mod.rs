//! Article persistence with secondary indexes.
//!
//! The [`ArticleStore`] trait is the seam between request handlers and the
//! storage backend. [`MemoryStore`] is the in-process implementation backed
//! by a document map plus domain/keyword/full-text indexes that are updated
//! atomically with the document under a single write lock.

mod index;
mod memory;

pub use memory::MemoryStore;

use crate::errors::Result;
use crate::model::{Article, ArticleDraft, SemanticData};
use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

/// Sort keys accepted by the list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreatedAt,
    PublicationDate,
    Title,
    ViewCount,
}

/// Paging and ordering for the list operation.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub limit: usize,
    pub offset: usize,
    pub sort_by: SortField,
    pub descending: bool,
}

/// One page of results plus the total matching count, independent of paging.
#[derive(Debug)]
pub struct Page {
    pub articles: Vec<Article>,
    pub total_count: usize,
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Persist a new article. Surfaces `AlreadyExists` on a uniqueness
    /// violation; all other input validation is the caller's responsibility.
    async fn create(&self, draft: ArticleDraft) -> Result<Article>;

    async fn get_by_id(&self, id: Uuid) -> Result<Article>;

    /// Active articles only, ordered by `query.sort_by`.
    async fn list(&self, query: ListQuery) -> Result<Page>;

    /// Weighted full-text search ordered by descending relevance.
    async fn search(&self, query: &str, limit: usize, offset: usize) -> Result<Page>;

    /// Articles in a domain, most recently published first.
    async fn find_by_domain(&self, domain: &str, limit: usize, offset: usize) -> Result<Page>;

    /// Articles carrying at least one of the given keywords, most recently
    /// published first.
    async fn find_by_keywords(&self, keywords: &[String], limit: usize, offset: usize)
        -> Result<Page>;

    /// Articles sharing the source's domain or at least one keyword, source
    /// excluded. Unranked by contract; ordering is stable insertion order.
    async fn find_similar(&self, source_id: Uuid, limit: usize) -> Result<Vec<Article>>;

    /// Atomic increment-and-read of the view counter.
    async fn increment_view_count(&self, id: Uuid) -> Result<Article>;

    /// Replace the article's semantic data (last writer wins).
    async fn update_semantic_data(&self, id: Uuid, data: SemanticData) -> Result<Article>;

    /// Release the backing resource during shutdown.
    async fn close(&self) -> Result<()>;
}
