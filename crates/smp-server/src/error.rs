//! HTTP error mapping.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use smp_cache::CacheError;
use smp_federation::FederationError;
use smp_metadata::MetadataError;
use thiserror::Error;

/// A request failure, rendered as a plain-text response.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] CacheError);

impl ApiError {
    /// Returns the underlying error.
    #[must_use]
    pub const fn inner(&self) -> &CacheError {
        &self.0
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<MetadataError> for ApiError {
    fn from(err: MetadataError) -> Self {
        Self(err.into())
    }
}

impl From<FederationError> for ApiError {
    fn from(err: FederationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        } else {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

/// Result type for request handlers.
pub type ApiResult<T> = Result<T, ApiError>;
