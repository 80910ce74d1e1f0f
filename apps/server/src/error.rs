// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types and handling for the server.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Plain-text body returned when an upload carries no file.
pub const NO_FILE_MESSAGE: &str = "No file uploaded.";

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file uploaded.")]
    MissingFile,

    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Failed to fetch GHI data for {lat}, {lng} on {date}")]
    GhiUnavailable { lat: f64, lng: f64, date: String },

    #[error("Model could not be loaded: {0}")]
    InvalidModel(#[from] bipv_lite_geometry::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Join error")]
    Join(#[from] tokio::task::JoinError),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::MissingFile => {
                return (
                    StatusCode::BAD_REQUEST,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    NO_FILE_MESSAGE,
                )
                    .into_response();
            }
            ApiError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
            ApiError::InvalidParameter(_) => (StatusCode::BAD_REQUEST, "INVALID_PARAMETER"),
            ApiError::Multipart(e) => (e.status(), "MULTIPART_ERROR"),
            ApiError::GhiUnavailable { .. } => (StatusCode::BAD_GATEWAY, "GHI_UNAVAILABLE"),
            ApiError::InvalidModel(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_MODEL"),
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Join(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TASK_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
