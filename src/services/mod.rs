use crate::config::AppConfig;
use crate::events::EventPublisher;
use crate::services::enrich::EnrichService;
use crate::store::ArticleStore;
use std::sync::Arc;

pub mod enrich;

/// Shared dependencies injected into the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ArticleStore>,
    pub events: Arc<dyn EventPublisher>,
    pub enrich: Arc<EnrichService>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn ArticleStore>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        let enrich = Arc::new(EnrichService::new(store.clone()));
        Self {
            config,
            store,
            events,
            enrich,
        }
    }
}
