//! HTTP error responses for web adapter.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::warn;

use crate::domain::error::StockdashError;

use super::templates::ErrorTemplate;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
    /// Render without the page shell, for HTMX swaps.
    pub fragment: bool,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fragment: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn as_fragment(mut self, fragment: bool) -> Self {
        self.fragment = fragment;
        self
    }
}

pub fn status_from_error(err: &StockdashError) -> StatusCode {
    match err {
        StockdashError::InvalidSymbol { .. } => StatusCode::NOT_FOUND,
        StockdashError::MalformedSeries { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        StockdashError::DateRangeInvalid { .. } | StockdashError::InvalidInput { .. } => {
            StatusCode::BAD_REQUEST
        }
        StockdashError::Provider { .. } => StatusCode::BAD_GATEWAY,
        StockdashError::ConfigParse { .. }
        | StockdashError::ConfigMissing { .. }
        | StockdashError::ConfigInvalid { .. }
        | StockdashError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<StockdashError> for WebError {
    fn from(err: StockdashError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = self.status.as_u16(), message = %self.message, "request failed");
        }
        let template = ErrorTemplate {
            message: &self.message,
            status: self.status.as_u16(),
        };
        let rendered = if self.fragment {
            template.fragment()
        } else {
            template.page()
        };
        match rendered {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(_) => (self.status, self.message).into_response(),
        }
    }
}
