//! HTML templates using Askama.

use askama::Template;

use crate::adapters::html_report_adapter::render_page;
use crate::domain::error::StockdashError;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate<'a> {
    pub symbol: &'a str,
    pub start: &'a str,
    pub end: &'a str,
    pub results: &'a str,
    pub source: &'a str,
}

impl<'a> DashboardTemplate<'a> {
    pub fn page(&self) -> Result<String, StockdashError> {
        let content = self
            .render()
            .map_err(|e| StockdashError::Io(std::io::Error::other(e.to_string())))?;
        render_page("Stock Market Data Analysis", &content, Some(self.source))
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}

impl<'a> ErrorTemplate<'a> {
    pub fn fragment(&self) -> Result<String, StockdashError> {
        self.render()
            .map_err(|e| StockdashError::Io(std::io::Error::other(e.to_string())))
    }

    pub fn page(&self) -> Result<String, StockdashError> {
        render_page("Error", &self.fragment()?, None)
    }
}
