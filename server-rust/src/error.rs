use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use beacon_midpoint::ResolveError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Beacon not found")]
    NotFound,

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Resolve(ResolveError::Configuration(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Resolve(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "data": null, "error": self.to_string() }))).into_response()
    }
}
