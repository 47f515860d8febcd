//! Startup and shutdown orchestration.
//!
//! Startup order (store, then broker, then listener) lives in `main`; this
//! module owns the termination path: signal handling, the ordered close
//! sequence and the hard deadline that bounds total shutdown time.

use crate::errors::Result;
use crate::events::EventPublisher;
use crate::store::ArticleStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// Resolves on SIGINT/SIGTERM, which makes the listener stop accepting and
/// drain. A watchdog armed here terminates the process if draining plus the
/// close sequence overruns the deadline.
pub async fn shutdown_signal(hard_deadline: Duration) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, starting shutdown"),
        _ = terminate => info!("received SIGTERM, starting shutdown"),
    }

    tokio::spawn(async move {
        tokio::time::sleep(hard_deadline).await;
        error!(deadline_secs = hard_deadline.as_secs(), "forcing shutdown after timeout");
        std::process::exit(1);
    });
}

/// Ordered close: disconnect the event bus first, then the store. In-flight
/// detached tasks are abandoned, not awaited. Returns false when the
/// sequence missed the deadline.
pub async fn run_shutdown(
    events: Arc<dyn EventPublisher>,
    store: Arc<dyn ArticleStore>,
    deadline: Duration,
) -> bool {
    let sequence = async {
        match events.close().await {
            Ok(()) => info!("event publisher disconnected"),
            Err(err) => warn!(error = %err, "event publisher close failed"),
        }
        match store.close().await {
            Ok(()) => info!("article store closed"),
            Err(err) => warn!(error = %err, "article store close failed"),
        }
    };
    tokio::time::timeout(deadline, sequence).await.is_ok()
}
