use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use article_service::config::AppConfig;
use article_service::events::{EventPublisher, MemoryEventBus, SqsEventBus};
use article_service::services::AppState;
use article_service::store::{ArticleStore, MemoryStore};
use article_service::{lifecycle, metrics, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Arc::new(AppConfig::load().context("failed to load configuration")?);
    init_tracing(&config);

    info!(
        version = article_service::VERSION,
        port = config.server.port,
        "starting {}",
        article_service::SERVICE_NAME
    );

    let metrics_handle = metrics::install().context("failed to install metrics recorder")?;
    metrics::register_metrics();

    let store: Arc<dyn ArticleStore> = Arc::new(MemoryStore::new());

    let events: Arc<dyn EventPublisher> = match &config.events.queue_url {
        Some(queue_url) => {
            info!(queue_url = %queue_url, "publishing domain events to SQS");
            Arc::new(SqsEventBus::new(queue_url.clone()).await)
        }
        None => {
            warn!("no event queue configured, domain events stay in process");
            Arc::new(MemoryEventBus::new())
        }
    };

    let state = AppState::new(config.clone(), store.clone(), events.clone());
    let app = routes::create_router(state).merge(metrics::router(metrics_handle));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    let shutdown_deadline = config.shutdown_timeout();
    axum::serve(listener, app)
        .with_graceful_shutdown(lifecycle::shutdown_signal(shutdown_deadline))
        .await
        .context("server error")?;

    if lifecycle::run_shutdown(events, store, shutdown_deadline).await {
        info!("shutdown complete");
        Ok(())
    } else {
        error!("shutdown deadline exceeded");
        std::process::exit(1);
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    if config.observability.json_logging {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
