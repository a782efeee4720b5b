//! Application setup and server configuration.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use site_crawler::Crawler;

use crate::config::Config;
use crate::kernel::RecencyCache;
use crate::server::routes::{crawl_handler, health_handler, webhook_handler};

/// Retention window for webhook event ids.
const WEBHOOK_CACHE_CAPACITY: usize = 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub crawler: Arc<Crawler>,
    pub processed_events: Arc<Mutex<RecencyCache>>,
    pub webhook_secret: Option<String>,
    pub crawl_max_pages: usize,
}

impl AppState {
    pub fn new(crawler: Crawler, config: &Config) -> Self {
        Self {
            crawler: Arc::new(crawler),
            processed_events: Arc::new(Mutex::new(RecencyCache::new(WEBHOOK_CACHE_CAPACITY))),
            webhook_secret: config.webhook_secret.clone(),
            crawl_max_pages: config.crawl_max_pages,
        }
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - allow any origin; the API carries no cookies
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/crawl", post(crawl_handler))
        .route("/api/webhooks", post(webhook_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
