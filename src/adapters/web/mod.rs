//! Web server adapter.
//!
//! Axum server with an HTMX front end: a query form, the dashboard results,
//! and raw SVG chart endpoints. Upstream fetches go through the shared
//! fetch cache on the blocking pool.

mod error;
mod handlers;
mod templates;

pub use error::WebError;
pub use handlers::*;
pub use templates::*;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::adapters::cached_adapter::CachedDataPort;
use crate::adapters::dashboard_view::ViewOptions;
use crate::domain::error::StockdashError;
use crate::domain::metrics::MetricsConfig;
use crate::ports::data_port::DataPort;

pub type SharedDataPort = CachedDataPort<Box<dyn DataPort + Send + Sync>>;

pub struct AppState {
    pub data: Arc<SharedDataPort>,
    pub metrics: MetricsConfig,
    pub view: ViewOptions,
    pub default_symbol: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/dashboard", get(handlers::dashboard))
        .route("/chart/price.svg", get(handlers::price_chart))
        .route("/chart/returns.svg", get(handlers::returns_chart))
        .route("/chart/volatility.svg", get(handlers::volatility_chart))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Binds `listen` and serves until the process is stopped.
pub async fn serve(state: AppState, listen: &str) -> Result<(), StockdashError> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(addr = %listener.local_addr()?, "web server listening");
    axum::serve(listener, router).await?;
    Ok(())
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}
