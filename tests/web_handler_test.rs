#![cfg(feature = "web")]
//! Web handler integration tests.
//!
//! Tests cover:
//! - Full page vs HTMX fragment responses
//! - Empty state for unknown symbols and empty ranges
//! - Status codes for invalid input, malformed series, provider failures
//! - SVG chart endpoints
//! - Fetch cache shared across requests

mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Local;
use http_body_util::BodyExt;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use stockdash::adapters::cached_adapter::{CachedDataPort, EvictionPolicy};
use stockdash::adapters::dashboard_view::ViewOptions;
use stockdash::adapters::web::{AppState, build_router};
use stockdash::domain::metrics::MetricsConfig;
use stockdash::ports::data_port::DataPort;
use tower::ServiceExt;

use common::*;

fn app_with(port: MockDataPort) -> Router {
    let boxed: Box<dyn DataPort + Send + Sync> = Box::new(port);
    let state = AppState {
        data: Arc::new(CachedDataPort::new(boxed, EvictionPolicy::Never)),
        metrics: MetricsConfig::default(),
        view: ViewOptions::default(),
        default_symbol: "AAPL".to_string(),
    };
    build_router(state)
}

fn create_test_app() -> Router {
    app_with(
        MockDataPort::new()
            .with_bars("AAPL", generate_bars("2024-01-01", 90, 100.0))
            .with_error("DOWN", "upstream timeout")
            .with_bars(
                "DUP",
                vec![make_bar("2024-01-02", 10.0), make_bar("2024-01-02", 11.0)],
            ),
    )
}

/// Bars ending yesterday, inside the default trailing-year window.
fn recent_bars(count: usize) -> Vec<OhlcvBar> {
    let start = Local::now().date_naive() - chrono::Duration::days(count as i64);
    generate_bars(&start.to_string(), count, 50.0)
}

async fn get(app: Router, uri: &str, htmx: bool) -> (StatusCode, String) {
    let mut builder = Request::builder().uri(uri);
    if htmx {
        builder = builder.header("HX-Request", "true");
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&body).into_owned())
}

const RANGE: &str = "start=2024-01-01&end=2024-03-31";

mod dashboard_tests {
    use super::*;

    #[tokio::test]
    async fn root_renders_default_query_as_full_page() {
        let app = app_with(MockDataPort::new().with_bars("AAPL", recent_bars(60)));

        let (status, html) = get(app, "/", false).await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("name=\"symbol\""));
        assert!(html.contains("value=\"AAPL\""));
        assert!(html.contains("type=\"date\""));
        assert!(html.contains("AAPL Stock Price Trend"));
        assert!(html.contains("<title>Stock Market Data Analysis</title>"));
        assert!(html.contains("Data source: mock"));
    }

    #[tokio::test]
    async fn dashboard_query_renders_charts_and_tables() {
        let app = create_test_app();

        let (status, html) = get(app, &format!("/dashboard?symbol=aapl&{}", RANGE), false).await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("AAPL from 2024-01-01 to 2024-03-31"));
        assert!(html.contains("Daily Returns Distribution"));
        assert!(html.contains("Stock Volatility Over Time"));
        assert!(html.contains("Statistical Summary"));
        assert!(html.contains("Raw Data"));
        assert!(html.contains("value=\"2024-03-31\""));
    }

    #[tokio::test]
    async fn htmx_request_returns_fragment_only() {
        let app = create_test_app();

        let (status, html) = get(app, &format!("/dashboard?symbol=AAPL&{}", RANGE), true).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!html.contains("<html"));
        assert!(!html.contains("<form"));
        assert!(!html.contains("Data source:"));
        assert!(html.contains("<svg"));
    }

    #[tokio::test]
    async fn unknown_symbol_shows_empty_state() {
        let app = create_test_app();

        let (status, html) = get(app, &format!("/dashboard?symbol=ZZZZ&{}", RANGE), true).await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("No data found for ZZZZ between 2024-01-01 and 2024-03-31"));
        assert!(!html.contains("<svg"));
    }

    #[tokio::test]
    async fn range_without_rows_shows_empty_state() {
        let app = create_test_app();

        let (status, html) = get(
            app,
            "/dashboard?symbol=AAPL&start=2010-01-01&end=2010-12-31",
            true,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("No data found for AAPL between 2010-01-01 and 2010-12-31"));
    }
}

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn end_before_start_is_bad_request() {
        let app = create_test_app();
        let (status, html) = get(
            app,
            "/dashboard?symbol=AAPL&start=2024-03-01&end=2024-01-01",
            false,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("end date 2024-01-01 is before start date 2024-03-01"));
    }

    #[tokio::test]
    async fn unparsable_date_is_bad_request() {
        let app = create_test_app();
        let (status, _) = get(app, "/dashboard?symbol=AAPL&start=yesterday", true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_series_is_unprocessable() {
        let app = create_test_app();
        let (status, _) = get(app, &format!("/dashboard?symbol=DUP&{}", RANGE), false).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn provider_failure_is_bad_gateway() {
        let app = create_test_app();
        let (status, html) = get(app, &format!("/dashboard?symbol=DOWN&{}", RANGE), true).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(html.contains("upstream timeout"));
        assert!(!html.contains("<html"));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = create_test_app();
        let (status, html) = get(app, "/nope", false).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("Page not found"));
    }
}

mod chart_tests {
    use super::*;

    #[tokio::test]
    async fn chart_endpoints_return_svg() {
        for path in ["price", "returns", "volatility"] {
            let app = create_test_app();
            let response = app
                .oneshot(
                    Request::builder()
                        .uri(format!("/chart/{}.svg?symbol=AAPL&{}", path, RANGE))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers().get(header::CONTENT_TYPE).unwrap(),
                "image/svg+xml"
            );
            let body = response.into_body().collect().await.unwrap().to_bytes();
            let svg = String::from_utf8_lossy(&body);
            assert!(svg.starts_with("<svg"), "{} chart", path);
            assert!(svg.ends_with("</svg>"), "{} chart", path);
        }
    }

    #[tokio::test]
    async fn chart_for_unknown_symbol_says_no_data() {
        let app = create_test_app();
        let (status, svg) = get(app, &format!("/chart/price.svg?symbol=ZZZZ&{}", RANGE), false).await;
        assert_eq!(status, StatusCode::OK);
        assert!(svg.contains("No data available."));
    }
}

mod cache_tests {
    use super::*;

    #[tokio::test]
    async fn repeated_query_fetches_once() {
        let port = MockDataPort::new().with_bars("AAPL", generate_bars("2024-01-01", 90, 100.0));
        let calls = port.call_counter();
        let app = app_with(port);
        let uri = format!("/dashboard?symbol=AAPL&{}", RANGE);

        let (first, _) = get(app.clone(), &uri, true).await;
        let (second, _) = get(app.clone(), &uri, true).await;
        let (chart, _) = get(app, &format!("/chart/price.svg?symbol=AAPL&{}", RANGE), false).await;

        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);
        assert_eq!(chart, StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_retried() {
        let port = MockDataPort::new().with_error("DOWN", "timeout");
        let calls = port.call_counter();
        let app = app_with(port);
        let uri = format!("/dashboard?symbol=DOWN&{}", RANGE);

        get(app.clone(), &uri, true).await;
        get(app, &uri, true).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

#[tokio::test]
async fn health_returns_ok() {
    let app = create_test_app();
    let (status, body) = get(app, "/health", false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
