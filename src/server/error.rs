//! HTTP error responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::orchestrator::ReviewError;

/// Error returned by a handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request cannot be served as given.
    #[error("{message}")]
    BadRequest { status: StatusCode, message: String },

    /// Anything else.
    #[error("Review failed: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        if err.is_client_error() {
            Self::BadRequest {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            }
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}
