use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::service::ServiceError;
use crate::storage::StoreError;
use crate::utils::response::error as error_response;

/// Failure of one request, already classified into the status it answers with.
///
/// The same [`ServiceError`] maps to different statuses depending on the
/// endpoint, so handlers pick one of the `from_*` constructors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    /// Create and update: a missing title is 503, everything else is 500.
    pub fn from_write(err: ServiceError) -> Self {
        match err {
            ServiceError::TitleRequired => AppError::ServiceUnavailable(err.to_string()),
            other => AppError::InternalServerError(other.to_string()),
        }
    }

    /// Delete: a lookup miss is 503, everything else is 400.
    pub fn from_delete(err: ServiceError) -> Self {
        match err {
            ServiceError::Store(StoreError::UserNotFound | StoreError::EventNotFound) => {
                AppError::ServiceUnavailable(err.to_string())
            }
            other => AppError::BadRequest(other.to_string()),
        }
    }

    /// Listings: malformed input is 400, any store failure is 503.
    pub fn from_listing(err: ServiceError) -> Self {
        if err.is_parse_error() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::ServiceUnavailable(err.to_string())
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::ServiceUnavailable(msg)
            | AppError::InternalServerError(msg) => msg,
        }
    }

    fn log(&self) {
        match self {
            AppError::InternalServerError(msg) => {
                error!(error = ?self, message = %msg, "Request failed");
            }
            AppError::BadRequest(msg) | AppError::ServiceUnavailable(msg) => {
                warn!(status = %self.status_code(), message = %msg, "Request rejected");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        error_response(self.message(), self.status_code())
    }
}
