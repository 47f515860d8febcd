//! Article ingestion and retrieval service.
//!
//! Accepts structured articles, persists them with searchable secondary
//! indexes, enriches their content asynchronously, serves lookup/search/
//! similarity queries and publishes fire-and-forget domain events for every
//! significant state change.

pub mod config;
pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod metrics;
pub mod model;
pub mod routes;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name used in logs and event records
pub const SERVICE_NAME: &str = "article-service";
