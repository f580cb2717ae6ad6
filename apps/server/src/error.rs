// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types and handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use wallscale_measure::{FailureKind, MeasureError};

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing '{0}' field in request")]
    MissingField(&'static str),

    #[error("Empty '{0}' field (expected file bytes)")]
    EmptyField(&'static str),

    #[error("File too large: maximum size is {max_mb} MB")]
    FileTooLarge { max_mb: usize },

    #[error("Image too large: {pixels} pixels (max {max_pixels})")]
    ImageTooLarge { pixels: u64, max_pixels: u64 },

    #[error("Cannot decode image: {0}")]
    InvalidImage(String),

    #[error("Invalid label map: {0}")]
    InvalidLabelMap(String),

    #[error("Invalid categories: {0}")]
    InvalidCategories(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error(transparent)]
    Measure(#[from] MeasureError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Join error")]
    Join(#[from] tokio::task::JoinError),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// What the user can do about it, for measurement failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ApiError {
    /// HTTP status and machine-readable code.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
            ApiError::EmptyField(_) => (StatusCode::BAD_REQUEST, "EMPTY_FIELD"),
            ApiError::FileTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE"),
            ApiError::ImageTooLarge { .. } => (StatusCode::BAD_REQUEST, "IMAGE_TOO_LARGE"),
            ApiError::InvalidImage(_) => (StatusCode::BAD_REQUEST, "INVALID_IMAGE"),
            ApiError::InvalidLabelMap(_) => (StatusCode::BAD_REQUEST, "INVALID_LABEL_MAP"),
            ApiError::InvalidCategories(_) => (StatusCode::BAD_REQUEST, "INVALID_CATEGORIES"),
            ApiError::Multipart(e) => (e.status(), "MULTIPART_ERROR"),
            ApiError::Measure(e) => match e.kind() {
                FailureKind::DocumentNotFound => (StatusCode::UNPROCESSABLE_ENTITY, "DOCUMENT_NOT_FOUND"),
                FailureKind::InvalidScale => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_SCALE"),
                FailureKind::InvalidDimensions => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_DIMENSIONS"),
                FailureKind::InvalidInput => (StatusCode::BAD_REQUEST, "LABEL_MAP_MISMATCH"),
                FailureKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "MEASUREMENT_ERROR"),
            },
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Join(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TASK_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        } else {
            tracing::debug!(error = %self, code, "Request rejected");
        }

        let hint = match &self {
            ApiError::Measure(e) if e.is_user_actionable() => Some(e.user_message()),
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            hint,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_failures_are_unprocessable() {
        let (status, code) = ApiError::from(MeasureError::DocumentNotFound).status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "DOCUMENT_NOT_FOUND");

        let (status, _) = ApiError::from(MeasureError::InvalidScale { px_per_cm: 0.0 }).status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_input_errors_are_bad_requests() {
        let mismatch = MeasureError::LabelMapMismatch {
            label_width: 1,
            label_height: 1,
            image_width: 2,
            image_height: 2,
        };
        assert_eq!(ApiError::from(mismatch).status_and_code().0, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingField("image").status_and_code().0, StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::FileTooLarge { max_mb: 50 }.status_and_code().0,
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
