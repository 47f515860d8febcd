//! Domain events and their publishing contract.
//!
//! Every significant state change emits a fire-and-forget event. Publishing
//! is best-effort and at-most-once: a transport failure is logged by the
//! detached task and never reaches the request that triggered it.

mod memory;
mod sqs;

pub use memory::MemoryEventBus;
pub use sqs::SqsEventBus;

use crate::errors::Result;
use crate::model::Article;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub const EVENT_ARTICLE_CREATED: &str = "article.created";
pub const EVENT_ARTICLE_VIEWED: &str = "article.viewed";
pub const EVENT_ARTICLE_SEARCHED: &str = "article.searched";

/// Payload field names are a published contract other services subscribe to,
/// hence the camelCase wire casing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPayload {
    pub article_id: Uuid,
    pub title: String,
    pub domain: String,
    pub keywords: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewedPayload {
    pub article_id: Uuid,
    pub title: String,
    pub domain: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchedPayload {
    pub query: String,
    pub result_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArticleEvent {
    Created(CreatedPayload),
    Viewed(ViewedPayload),
    Searched(SearchedPayload),
}

impl ArticleEvent {
    pub fn created(article: &Article) -> Self {
        Self::Created(CreatedPayload {
            article_id: article.id,
            title: article.title.clone(),
            domain: article.domain.clone(),
            keywords: article.keywords.clone(),
            timestamp: Utc::now(),
        })
    }

    pub fn viewed(article: &Article) -> Self {
        Self::Viewed(ViewedPayload {
            article_id: article.id,
            title: article.title.clone(),
            domain: article.domain.clone(),
            timestamp: Utc::now(),
        })
    }

    pub fn searched(query: impl Into<String>, result_count: usize) -> Self {
        Self::Searched(SearchedPayload {
            query: query.into(),
            result_count,
            timestamp: Utc::now(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => EVENT_ARTICLE_CREATED,
            Self::Viewed(_) => EVENT_ARTICLE_VIEWED,
            Self::Searched(_) => EVENT_ARTICLE_SEARCHED,
        }
    }

    /// The wire record: `{"eventType": ..., "payload": {...}}`.
    pub fn to_record(&self) -> serde_json::Value {
        let payload = match self {
            Self::Created(p) => serde_json::to_value(p),
            Self::Viewed(p) => serde_json::to_value(p),
            Self::Searched(p) => serde_json::to_value(p),
        }
        .expect("event payloads serialize infallibly");
        serde_json::json!({
            "eventType": self.kind(),
            "payload": payload,
        })
    }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Send one event to the bus. Callers that must not block on the bus go
    /// through [`publish_detached`] instead of calling this directly.
    async fn publish(&self, event: ArticleEvent) -> Result<()>;

    /// Flush and disconnect during shutdown.
    async fn close(&self) -> Result<()>;
}

/// Publish on a detached task. The originating request never observes the
/// outcome; failures are logged and counted.
pub fn publish_detached(bus: Arc<dyn EventPublisher>, event: ArticleEvent) {
    tokio::spawn(async move {
        let kind = event.kind();
        match bus.publish(event).await {
            Ok(()) => {
                metrics::counter!("article_events_published_total").increment(1);
            }
            Err(err) => {
                metrics::counter!("article_events_failed_total").increment(1);
                tracing::error!(event = kind, error = %err, "failed to publish domain event");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kinds_are_stable() {
        assert_eq!(ArticleEvent::searched("q", 0).kind(), "article.searched");
    }

    #[test]
    fn record_envelope_uses_published_field_names() {
        let record = ArticleEvent::searched("quantum", 3).to_record();
        assert_eq!(record["eventType"], "article.searched");
        assert_eq!(record["payload"]["query"], "quantum");
        assert_eq!(record["payload"]["resultCount"], 3);
        assert!(record["payload"]["timestamp"].is_string());
    }

    #[test]
    fn created_payload_carries_keywords() {
        use crate::model::{ArticleDraft, ArticleMetadata};
        let article = ArticleDraft {
            title: "T".into(),
            abstract_text: "A".into(),
            authors: vec![],
            domain: "physics".into(),
            keywords: vec!["quantum".into()],
            publication_date: None,
            content: "C".into(),
            url: None,
            metadata: ArticleMetadata::default(),
        }
        .into_article(uuid::Uuid::new_v4(), Utc::now());

        let record = ArticleEvent::created(&article).to_record();
        assert_eq!(record["payload"]["articleId"], article.id.to_string());
        assert_eq!(record["payload"]["keywords"][0], "quantum");
        assert_eq!(record["payload"]["domain"], "physics");
    }
}
