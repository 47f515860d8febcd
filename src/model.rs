//! Article entity and its nested document shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A named entity extracted from article content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub relevance: f64,
}

/// Enrichment output attached to an article.
///
/// `analyzed_at` stays `None` until the enrichment pipeline has run; the
/// analyze operation uses it as its idempotence guard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SemanticData {
    pub term_frequency: BTreeMap<String, u32>,
    pub extracted_keywords: Vec<String>,
    pub entities: Vec<Entity>,
    pub readability_score: f64,
    pub related_domains: Vec<String>,
    pub analyzed_at: Option<DateTime<Utc>>,
}

/// Bibliographic metadata and counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    pub citations: u32,
    pub references: Vec<String>,
    pub doi: Option<String>,
    pub journal: Option<String>,
    pub view_count: u64,
}

/// The persisted article entity. Field names follow the published wire
/// contract, matching the casing of the event payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub authors: Vec<String>,
    pub domain: String,
    pub keywords: Vec<String>,
    pub publication_date: DateTime<Utc>,
    pub content: String,
    pub url: Option<String>,
    pub semantic_data: SemanticData,
    pub metadata: ArticleMetadata,
    /// Soft-delete flag; inactive articles are excluded from listing.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an article. The store assigns id, timestamps and the
/// `active` flag; handlers are responsible for field validation.
#[derive(Debug, Clone)]
pub struct ArticleDraft {
    pub title: String,
    pub abstract_text: String,
    pub authors: Vec<String>,
    pub domain: String,
    pub keywords: Vec<String>,
    pub publication_date: Option<DateTime<Utc>>,
    pub content: String,
    pub url: Option<String>,
    pub metadata: ArticleMetadata,
}

impl ArticleDraft {
    /// Materialize the draft into a full article at `now`.
    pub(crate) fn into_article(self, id: Uuid, now: DateTime<Utc>) -> Article {
        Article {
            id,
            title: self.title,
            abstract_text: self.abstract_text,
            authors: self.authors,
            domain: self.domain,
            keywords: self.keywords,
            publication_date: self.publication_date.unwrap_or(now),
            content: self.content,
            url: self.url,
            semantic_data: SemanticData::default(),
            metadata: self.metadata,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ArticleDraft {
        ArticleDraft {
            title: "Quantum Error Correction".into(),
            abstract_text: "A survey of stabilizer codes.".into(),
            authors: vec!["A. Author".into()],
            domain: "physics".into(),
            keywords: vec!["quantum".into()],
            publication_date: None,
            content: "Lorem ipsum.".into(),
            url: None,
            metadata: ArticleMetadata::default(),
        }
    }

    #[test]
    fn draft_defaults_publication_date_to_creation_time() {
        let now = Utc::now();
        let article = draft().into_article(Uuid::new_v4(), now);
        assert_eq!(article.publication_date, now);
        assert_eq!(article.created_at, now);
        assert!(article.active);
        assert!(article.semantic_data.analyzed_at.is_none());
        assert_eq!(article.metadata.view_count, 0);
    }

    #[test]
    fn article_serializes_abstract_field_name() {
        let article = draft().into_article(Uuid::new_v4(), Utc::now());
        let value = serde_json::to_value(&article).unwrap();
        assert!(value.get("abstract").is_some());
        assert!(value.get("abstract_text").is_none());
        assert!(value.get("semanticData").is_some());
        assert!(value["metadata"].get("viewCount").is_some());
    }
}
