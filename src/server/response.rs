//! Error → JSON mapping at the request boundary.

use crate::config::Locale;
use crate::error::{ErrorKind, ExtractError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// An [`ExtractError`] paired with the locale its message is rendered in.
#[derive(Debug)]
pub struct ApiError {
    pub error: ExtractError,
    pub locale: Locale,
}

impl ApiError {
    pub fn new(error: ExtractError, locale: Locale) -> Self {
        Self { error, locale }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    error_type: &'static str,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.error.kind();
        let status = StatusCode::from_u16(kind.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match kind {
            ErrorKind::Processing => tracing::error!("Processing error: {}", self.error),
            _ => tracing::warn!("Rejected request: {}", self.error),
        }

        let body = Json(ErrorBody {
            success: false,
            error: self.error.localized(self.locale),
            error_type: kind.tag(),
            detail: self.error.to_string(),
        });

        (status, body).into_response()
    }
}
