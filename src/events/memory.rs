//! In-process event bus.
//!
//! Used when no queue URL is configured and by the test suite: events are
//! logged and retained in memory so observers (tests, local debugging) can
//! inspect what would have been published.

use super::{ArticleEvent, EventPublisher};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryEventBus {
    records: Mutex<Vec<ArticleEvent>>,
}

impl MemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far.
    pub fn events(&self) -> Vec<ArticleEvent> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventPublisher for MemoryEventBus {
    async fn publish(&self, event: ArticleEvent) -> Result<()> {
        tracing::debug!(event = event.kind(), record = %event.to_record(), "domain event");
        self.records
            .lock()
            .map_err(|_| AppError::EventBus("event buffer lock poisoned".to_string()))?
            .push(event);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let pending = self.events().len();
        tracing::debug!(recorded = pending, "in-process event bus closed");
        Ok(())
    }
}
