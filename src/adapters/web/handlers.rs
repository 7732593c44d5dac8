//! HTTP request handlers for web adapter.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Response},
};
use chrono::Local;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::adapters::chart_svg;
use crate::adapters::dashboard_view::DashboardView;
use crate::adapters::html_report_adapter::render_results;
use crate::domain::error::StockdashError;
use crate::domain::histogram::Histogram;
use crate::domain::metrics::compute_metrics;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::query::PriceQuery;
use crate::ports::data_port::DataPort;

use super::{AppState, WebError, is_htmx_request};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub symbol: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DashboardParams {
    fn to_query(&self, default_symbol: &str) -> Result<PriceQuery, StockdashError> {
        PriceQuery::from_parts(
            self.symbol.as_deref(),
            self.start.as_deref(),
            self.end.as_deref(),
            default_symbol,
            Local::now().date_naive(),
        )
    }
}

/// Fetches through the cache on the blocking pool. `None` means the
/// provider had nothing for the query.
async fn load_series(
    state: &Arc<AppState>,
    query: &PriceQuery,
) -> Result<Option<Arc<PriceSeries>>, StockdashError> {
    let shared = Arc::clone(state);
    let key = query.clone();
    let result = tokio::task::spawn_blocking(move || shared.data.get_series(&key))
        .await
        .map_err(|e| StockdashError::Provider {
            reason: format!("fetch task failed: {}", e),
        })?;

    match result {
        Ok(series) if series.is_empty() => Ok(None),
        Ok(series) => Ok(Some(series)),
        Err(e) if e.is_empty_state() => {
            debug!(symbol = %query.symbol, error = %e, "no data for query");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

async fn build_view(state: &Arc<AppState>, query: &PriceQuery) -> Result<DashboardView, StockdashError> {
    let view = match load_series(state, query).await? {
        Some(series) => {
            let augmented = compute_metrics(&series, &state.metrics);
            DashboardView::build(query, &augmented, &state.view)
        }
        None => DashboardView::empty(query),
    };
    Ok(view)
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<DashboardParams>,
) -> Result<Response, WebError> {
    let htmx = is_htmx_request(&headers);
    let fail = |e: StockdashError| WebError::from(e).as_fragment(htmx);

    let query = params.to_query(&state.default_symbol).map_err(fail)?;
    let view = build_view(&state, &query).await.map_err(fail)?;
    let results = render_results(&view).map_err(fail)?;

    info!(
        symbol = %query.symbol,
        start = %query.start,
        end = %query.end,
        has_data = view.has_data,
        "rendered dashboard"
    );

    if htmx {
        return Ok(Html(results).into_response());
    }

    let start = query.start.to_string();
    let end = query.end.to_string();
    let template = super::templates::DashboardTemplate {
        symbol: &query.symbol,
        start: &start,
        end: &end,
        results: &results,
        source: state.data.source(),
    };
    Ok(Html(template.page().map_err(fail)?).into_response())
}

#[derive(Debug, Clone, Copy)]
enum ChartKind {
    Price,
    Returns,
    Volatility,
}

fn svg_response(svg: String) -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
}

async fn chart(state: Arc<AppState>, params: DashboardParams, kind: ChartKind) -> Result<Response, WebError> {
    let query = params.to_query(&state.default_symbol)?;
    let series = load_series(&state, &query)
        .await?
        .unwrap_or_else(|| Arc::new(PriceSeries::empty(&query.symbol)));
    let augmented = compute_metrics(&series, &state.metrics);

    let svg = match kind {
        ChartKind::Price => chart_svg::price_chart_svg(&augmented),
        ChartKind::Returns => chart_svg::returns_histogram_svg(&Histogram::from_values(
            &augmented.daily_returns(),
            state.view.histogram_bins,
        )),
        ChartKind::Volatility => chart_svg::volatility_chart_svg(&augmented),
    };
    Ok(svg_response(svg))
}

pub async fn price_chart(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Result<Response, WebError> {
    chart(state, params, ChartKind::Price).await
}

pub async fn returns_chart(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Result<Response, WebError> {
    chart(state, params, ChartKind::Returns).await
}

pub async fn volatility_chart(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Result<Response, WebError> {
    chart(state, params, ChartKind::Volatility).await
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn not_found(headers: HeaderMap) -> WebError {
    WebError::not_found("Page not found").as_fragment(is_htmx_request(&headers))
}
