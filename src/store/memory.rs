//! In-process article store.
//!
//! A single write lock guards the document map together with every secondary
//! index, so an article and its index entries can never diverge. Lock scopes
//! never span an await point.

use super::index::{tokenize_query, DocumentIndex};
use super::{ArticleStore, ListQuery, Page, SortField};
use crate::errors::{AppError, Result};
use crate::model::{Article, ArticleDraft, SemanticData};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct StoreInner {
    articles: HashMap<Uuid, Article>,
    /// Insertion sequence, the stable tie-breaker for every ordering.
    seq: HashMap<Uuid, u64>,
    next_seq: u64,
    by_domain: HashMap<String, HashSet<Uuid>>,
    by_keyword: HashMap<String, HashSet<Uuid>>,
    text: HashMap<Uuid, DocumentIndex>,
    /// Uniqueness index over normalized (title, domain).
    unique: HashMap<(String, String), Uuid>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_poisoned() -> AppError {
        AppError::Store("store lock poisoned".to_string())
    }
}

fn unique_key(title: &str, domain: &str) -> (String, String) {
    (
        title.trim().to_lowercase(),
        domain.trim().to_lowercase(),
    )
}

fn sort_value_cmp(a: &Article, b: &Article, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::PublicationDate => a.publication_date.cmp(&b.publication_date),
        SortField::Title => a.title.cmp(&b.title),
        SortField::ViewCount => a.metadata.view_count.cmp(&b.metadata.view_count),
    }
}

fn paginate(articles: Vec<Article>, offset: usize, limit: usize) -> Page {
    let total_count = articles.len();
    let articles = articles.into_iter().skip(offset).take(limit).collect();
    Page {
        articles,
        total_count,
    }
}

impl StoreInner {
    fn seq_of(&self, id: &Uuid) -> u64 {
        self.seq.get(id).copied().unwrap_or(u64::MAX)
    }

    /// Matching articles sorted by publication date descending, insertion
    /// order as tie-break. Shared by the domain and keyword lookups.
    fn collect_recent(&self, ids: &HashSet<Uuid>) -> Vec<Article> {
        let mut articles: Vec<&Article> =
            ids.iter().filter_map(|id| self.articles.get(id)).collect();
        articles.sort_by(|a, b| {
            b.publication_date
                .cmp(&a.publication_date)
                .then_with(|| self.seq_of(&a.id).cmp(&self.seq_of(&b.id)))
        });
        articles.into_iter().cloned().collect()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn create(&self, draft: ArticleDraft) -> Result<Article> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_poisoned())?;

        let key = unique_key(&draft.title, &draft.domain);
        if inner.unique.contains_key(&key) {
            return Err(AppError::AlreadyExists(format!(
                "article '{}' already exists in domain '{}'",
                draft.title, draft.domain
            )));
        }

        let id = Uuid::new_v4();
        if inner.articles.contains_key(&id) {
            return Err(AppError::AlreadyExists(format!("article id {id}")));
        }

        let article = draft.into_article(id, Utc::now());

        let text = DocumentIndex::build(
            &article.title,
            &article.abstract_text,
            &article.keywords,
            &article.content,
        );

        let sequence = inner.next_seq;
        inner.next_seq += 1;
        inner.seq.insert(id, sequence);
        inner
            .by_domain
            .entry(article.domain.clone())
            .or_default()
            .insert(id);
        for keyword in &article.keywords {
            inner.by_keyword.entry(keyword.clone()).or_default().insert(id);
        }
        inner.text.insert(id, text);
        inner.unique.insert(key, id);
        inner.articles.insert(id, article.clone());

        tracing::debug!(article_id = %id, domain = %article.domain, "article stored");
        Ok(article)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Article> {
        let inner = self.inner.read().map_err(|_| Self::lock_poisoned())?;
        inner
            .articles
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::article_not_found(id))
    }

    async fn list(&self, query: ListQuery) -> Result<Page> {
        let inner = self.inner.read().map_err(|_| Self::lock_poisoned())?;
        let mut articles: Vec<&Article> =
            inner.articles.values().filter(|a| a.active).collect();
        articles.sort_by(|a, b| {
            let by_field = sort_value_cmp(a, b, query.sort_by)
                .then_with(|| inner.seq_of(&a.id).cmp(&inner.seq_of(&b.id)));
            if query.descending {
                by_field.reverse()
            } else {
                by_field
            }
        });
        let articles = articles.into_iter().cloned().collect();
        Ok(paginate(articles, query.offset, query.limit))
    }

    async fn search(&self, query: &str, limit: usize, offset: usize) -> Result<Page> {
        let terms = tokenize_query(query);
        let inner = self.inner.read().map_err(|_| Self::lock_poisoned())?;

        let mut scored: Vec<(u32, u64, &Article)> = inner
            .articles
            .values()
            .filter_map(|article| {
                let score = inner.text.get(&article.id)?.score(&terms);
                (score > 0).then(|| (score, inner.seq_of(&article.id), article))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        let articles = scored.into_iter().map(|(_, _, a)| a.clone()).collect();
        Ok(paginate(articles, offset, limit))
    }

    async fn find_by_domain(&self, domain: &str, limit: usize, offset: usize) -> Result<Page> {
        let inner = self.inner.read().map_err(|_| Self::lock_poisoned())?;
        let articles = match inner.by_domain.get(domain) {
            Some(ids) => inner.collect_recent(ids),
            None => Vec::new(),
        };
        Ok(paginate(articles, offset, limit))
    }

    async fn find_by_keywords(
        &self,
        keywords: &[String],
        limit: usize,
        offset: usize,
    ) -> Result<Page> {
        let inner = self.inner.read().map_err(|_| Self::lock_poisoned())?;
        let mut ids: HashSet<Uuid> = HashSet::new();
        for keyword in keywords {
            if let Some(matched) = inner.by_keyword.get(keyword) {
                ids.extend(matched);
            }
        }
        let articles = inner.collect_recent(&ids);
        Ok(paginate(articles, offset, limit))
    }

    async fn find_similar(&self, source_id: Uuid, limit: usize) -> Result<Vec<Article>> {
        let inner = self.inner.read().map_err(|_| Self::lock_poisoned())?;
        let source = inner
            .articles
            .get(&source_id)
            .ok_or_else(|| AppError::article_not_found(source_id))?;
        let source_keywords: HashSet<&String> = source.keywords.iter().collect();

        let mut candidates: Vec<&Article> = inner
            .articles
            .values()
            .filter(|article| {
                article.id != source_id
                    && (article.domain == source.domain
                        || article.keywords.iter().any(|k| source_keywords.contains(k)))
            })
            .collect();
        // Unranked by contract; insertion order keeps the result deterministic.
        candidates.sort_by_key(|article| inner.seq_of(&article.id));

        Ok(candidates.into_iter().take(limit).cloned().collect())
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<Article> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_poisoned())?;
        let article = inner
            .articles
            .get_mut(&id)
            .ok_or_else(|| AppError::article_not_found(id))?;
        article.metadata.view_count += 1;
        article.updated_at = Utc::now();
        Ok(article.clone())
    }

    async fn update_semantic_data(&self, id: Uuid, data: SemanticData) -> Result<Article> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_poisoned())?;
        let article = inner
            .articles
            .get_mut(&id)
            .ok_or_else(|| AppError::article_not_found(id))?;
        article.semantic_data = data;
        article.updated_at = Utc::now();
        Ok(article.clone())
    }

    async fn close(&self) -> Result<()> {
        tracing::debug!("article store closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArticleMetadata;
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn draft(title: &str, domain: &str, keywords: &[&str], content: &str) -> ArticleDraft {
        ArticleDraft {
            title: title.into(),
            abstract_text: format!("{title} abstract"),
            authors: vec!["Test Author".into()],
            domain: domain.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            publication_date: None,
            content: content.into(),
            url: None,
            metadata: ArticleMetadata::default(),
        }
    }

    #[tokio::test]
    async fn create_then_get_roundtrip() {
        let store = MemoryStore::new();
        let created = store
            .create(draft("Quantum Gravity", "physics", &["quantum"], "body text"))
            .await
            .unwrap();
        let fetched = store.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.title, "Quantum Gravity");
        assert_eq!(fetched.domain, "physics");
        assert_eq!(fetched.metadata.view_count, 0);
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn duplicate_title_in_same_domain_is_rejected() {
        let store = MemoryStore::new();
        store
            .create(draft("Dark Matter", "physics", &[], "a"))
            .await
            .unwrap();
        let err = store
            .create(draft("  dark matter ", "Physics", &[], "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
        // Same title is fine in a different domain.
        store
            .create(draft("Dark Matter", "astronomy", &[], "c"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_excludes_inactive_articles() {
        let store = MemoryStore::new();
        let kept = store.create(draft("Kept", "physics", &[], "a")).await.unwrap();
        let hidden = store.create(draft("Hidden", "physics", &[], "b")).await.unwrap();
        {
            let mut inner = store.inner.write().unwrap();
            inner.articles.get_mut(&hidden.id).unwrap().active = false;
        }

        let page = store
            .list(ListQuery {
                limit: 10,
                offset: 0,
                sort_by: SortField::CreatedAt,
                descending: true,
            })
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.articles[0].id, kept.id);
    }

    #[tokio::test]
    async fn list_reports_total_count_across_pages() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .create(draft(&format!("Article {i}"), "physics", &[], "x"))
                .await
                .unwrap();
        }
        let page = store
            .list(ListQuery {
                limit: 2,
                offset: 4,
                sort_by: SortField::Title,
                descending: false,
            })
            .await
            .unwrap();
        assert_eq!(page.total_count, 5);
        assert_eq!(page.articles.len(), 1);
        assert_eq!(page.articles[0].title, "Article 4");
    }

    #[tokio::test]
    async fn search_ranks_title_matches_above_content_matches() {
        let store = MemoryStore::new();
        let content_hit = store
            .create(draft(
                "Stellar Surveys",
                "astronomy",
                &[],
                "a note about quantum effects in telescopes",
            ))
            .await
            .unwrap();
        let title_hit = store
            .create(draft("Quantum Computing", "cs", &["quantum"], "circuits"))
            .await
            .unwrap();
        store
            .create(draft("Marine Biology", "biology", &[], "coral reefs"))
            .await
            .unwrap();

        let page = store.search("quantum", 10, 0).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.articles[0].id, title_hit.id);
        assert_eq!(page.articles[1].id, content_hit.id);
    }

    #[tokio::test]
    async fn search_ties_break_by_insertion_order() {
        let store = MemoryStore::new();
        let first = store
            .create(draft("Graphene One", "materials", &[], "graphene sheet"))
            .await
            .unwrap();
        let second = store
            .create(draft("Graphene Two", "materials", &[], "graphene sheet"))
            .await
            .unwrap();

        let page = store.search("graphene", 10, 0).await.unwrap();
        assert_eq!(page.articles[0].id, first.id);
        assert_eq!(page.articles[1].id, second.id);
    }

    #[tokio::test]
    async fn find_by_keywords_matches_membership_only() {
        let store = MemoryStore::new();
        let tagged = store
            .create(draft("Tagged", "cs", &["x", "y"], "body"))
            .await
            .unwrap();
        store
            .create(draft("Untagged", "cs", &["z"], "x appears in content only"))
            .await
            .unwrap();

        let page = store
            .find_by_keywords(&["x".to_string()], 10, 0)
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.articles[0].id, tagged.id);
    }

    #[tokio::test]
    async fn find_by_domain_orders_by_publication_date_desc() {
        let store = MemoryStore::new();
        let mut older = draft("Older", "physics", &[], "a");
        older.publication_date = Some(Utc::now() - Duration::days(10));
        let older = store.create(older).await.unwrap();
        let newer = store.create(draft("Newer", "physics", &[], "b")).await.unwrap();

        let page = store.find_by_domain("physics", 10, 0).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.articles[0].id, newer.id);
        assert_eq!(page.articles[1].id, older.id);
    }

    #[tokio::test]
    async fn similar_matches_domain_or_keyword_and_excludes_source() {
        let store = MemoryStore::new();
        let source = store
            .create(draft("Source", "physics", &["quantum"], "a"))
            .await
            .unwrap();
        let same_domain = store
            .create(draft("Same Domain", "physics", &["optics"], "b"))
            .await
            .unwrap();
        let shared_keyword = store
            .create(draft("Shared Keyword", "cs", &["quantum"], "c"))
            .await
            .unwrap();
        store
            .create(draft("Unrelated", "biology", &["genome"], "d"))
            .await
            .unwrap();

        let similar = store.find_similar(source.id, 5).await.unwrap();
        let ids: Vec<Uuid> = similar.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![same_domain.id, shared_keyword.id]);
        assert!(!ids.contains(&source.id));
    }

    #[tokio::test]
    async fn similar_unknown_source_is_not_found() {
        let store = MemoryStore::new();
        let err = store.find_similar(Uuid::new_v4(), 5).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_view_increments_lose_no_updates() {
        let store = Arc::new(MemoryStore::new());
        let article = store
            .create(draft("Popular", "cs", &[], "body"))
            .await
            .unwrap();

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                let id = article.id;
                tokio::spawn(async move { store.increment_view_count(id).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let fetched = store.get_by_id(article.id).await.unwrap();
        assert_eq!(fetched.metadata.view_count, 32);
    }

    #[tokio::test]
    async fn update_semantic_data_replaces_analysis() {
        let store = MemoryStore::new();
        let article = store
            .create(draft("Analyzable", "cs", &[], "body"))
            .await
            .unwrap();
        assert!(article.semantic_data.analyzed_at.is_none());

        let mut data = SemanticData::default();
        data.extracted_keywords = vec!["body".into()];
        data.analyzed_at = Some(Utc::now());
        let updated = store.update_semantic_data(article.id, data).await.unwrap();

        assert!(updated.semantic_data.analyzed_at.is_some());
        assert_eq!(updated.semantic_data.extracted_keywords, vec!["body"]);
    }
}
