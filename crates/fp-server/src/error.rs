use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use fp_index::IndexError;
use fp_service::ServiceError;
use fp_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::InvalidKey { .. } => StatusCode::BAD_REQUEST,
        StoreError::Unsupported { .. } => StatusCode::NOT_IMPLEMENTED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ServerError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Service(e) => match e {
                ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
                ServiceError::SizeLimitExceeded { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                ServiceError::Conflict { .. } => StatusCode::CONFLICT,
                ServiceError::Store(e) => store_status(e),
            },
            Self::Index(e) => match e {
                IndexError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
                IndexError::InvalidName(_) | IndexError::InvalidSpace(_) => StatusCode::BAD_REQUEST,
            },
            Self::Store(e) => store_status(e),
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "storage operation failed".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
