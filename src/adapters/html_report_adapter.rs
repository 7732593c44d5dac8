//! HTML report adapter implementing ReportPort.
//!
//! Renders the dashboard into a standalone HTML file with inline SVG charts.
//! The results fragment and page shell are shared with the web adapter.

use std::fs;
use std::path::Path;

use askama::Template;
use chrono::Local;
use tracing::info;

use crate::adapters::dashboard_view::{DashboardView, ViewOptions};
use crate::domain::error::StockdashError;
use crate::domain::metrics::AugmentedSeries;
use crate::domain::query::PriceQuery;
use crate::ports::report_port::ReportPort;

#[derive(Template)]
#[template(path = "base.html")]
pub struct BasePage<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub source: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate<'a> {
    pub view: &'a DashboardView,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    view: &'a DashboardView,
    generated: String,
    results: String,
}

fn render_error(e: askama::Error) -> StockdashError {
    StockdashError::Io(std::io::Error::other(e.to_string()))
}

/// The charts and tables for `view`, without the page shell.
pub fn render_results(view: &DashboardView) -> Result<String, StockdashError> {
    ResultsTemplate { view }.render().map_err(render_error)
}

/// Wraps an HTML fragment in the full page shell, with a data-source
/// footer when `source` is given.
pub fn render_page(
    title: &str,
    content: &str,
    source: Option<&str>,
) -> Result<String, StockdashError> {
    BasePage {
        title,
        content,
        source,
    }
    .render()
    .map_err(render_error)
}

pub struct HtmlReportAdapter {
    options: ViewOptions,
    source: Option<String>,
}

impl HtmlReportAdapter {
    pub fn new(options: ViewOptions) -> Self {
        Self {
            options,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn render(
        &self,
        query: &PriceQuery,
        augmented: &AugmentedSeries<'_>,
    ) -> Result<String, StockdashError> {
        let view = DashboardView::build(query, augmented, &self.options);
        let template = ReportTemplate {
            view: &view,
            generated: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            results: render_results(&view)?,
        };
        let content = template.render().map_err(render_error)?;
        render_page(
            &format!("{} - Stock Market Data Analysis", view.symbol),
            &content,
            self.source.as_deref(),
        )
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new(ViewOptions::default())
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(
        &self,
        query: &PriceQuery,
        augmented: &AugmentedSeries<'_>,
        output_path: &str,
    ) -> Result<(), StockdashError> {
        let html = self.render(query, augmented)?;

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(StockdashError::Io)?;
        }
        fs::write(path, html).map_err(StockdashError::Io)?;

        info!(path = %path.display(), symbol = %query.symbol, "wrote HTML report");
        Ok(())
    }
}
