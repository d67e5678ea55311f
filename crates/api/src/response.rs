//! Uniform JSON response envelope.
//!
//! Every endpoint, success or failure, answers with the same shape:
//!
//! ```json
//! { "statusCode": 200, "data": { ... }, "message": "...", "success": true }
//! ```
//!
//! Error responses carry `"data": null` and `"success": false`; see
//! [`crate::error::ApiError`] for how failures are funneled into this shape.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON envelope wrapping every API payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap `data` with an explicit status code.
    ///
    /// `success` is derived from the status class, so 4xx/5xx envelopes
    /// report `false` without callers having to remember to set it.
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.is_success(),
        }
    }

    /// `200 OK` envelope.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, data, message)
    }

    /// `201 Created` envelope.
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED, data, message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
