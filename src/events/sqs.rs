//! SQS-backed event bus.

use super::{ArticleEvent, EventPublisher};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;

pub struct SqsEventBus {
    client: SqsClient,
    queue_url: String,
}

impl SqsEventBus {
    /// Create a bus from ambient AWS configuration.
    pub async fn new(queue_url: String) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = SqsClient::new(&aws_config);
        Self { client, queue_url }
    }

    /// Create with an existing client (tests, custom endpoints).
    pub fn with_client(client: SqsClient, queue_url: String) -> Self {
        Self { client, queue_url }
    }
}

#[async_trait]
impl EventPublisher for SqsEventBus {
    async fn publish(&self, event: ArticleEvent) -> Result<()> {
        let body = serde_json::to_string(&event.to_record()).map_err(|e| {
            AppError::EventBus(format!("failed to serialize event record: {e}"))
        })?;

        let result = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| AppError::EventBus(format!("failed to send event: {e}")))?;

        tracing::debug!(
            event = event.kind(),
            message_id = result.message_id().unwrap_or_default(),
            "domain event sent to queue"
        );
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // SQS is connectionless; nothing buffered locally to flush.
        tracing::info!(queue_url = %self.queue_url, "event bus closed");
        Ok(())
    }
}
