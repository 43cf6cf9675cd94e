//! HTTP error responses.
//!
//! Every failure leaves the service as `{"error": "<message>"}` with a
//! status chosen from the [`VisentError`] variant.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::VisentError;

/// Prefix for any failure while processing an uploaded workbook.
pub const BATCH_FAILURE_PREFIX: &str = "Đã xảy ra lỗi khi xử lý file";

/// Prefix for an inference failure on the single-text endpoint.
pub const PREDICT_FAILURE_PREFIX: &str = "Đã xảy ra lỗi khi dự đoán";

/// An error ready to be sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Map a service error, prefixing server-side failures with `context`.
    ///
    /// Client errors keep their own message so validation text reaches the
    /// caller untouched.
    pub fn from_service(err: VisentError, context: &str) -> Self {
        match err {
            VisentError::InvalidInput(message) | VisentError::EmptyInput(message) => {
                Self::bad_request(message)
            }
            err @ VisentError::Json(_) => Self::bad_request(err.to_string()),
            err => Self::internal(format!("{context}: {err}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = ApiError::from_service(
            VisentError::InvalidInput("thiếu trường".into()),
            BATCH_FAILURE_PREFIX,
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "thiếu trường");
    }

    #[test]
    fn empty_input_is_bad_request() {
        let err = ApiError::from_service(
            VisentError::EmptyInput("File Excel rỗng.".into()),
            BATCH_FAILURE_PREFIX,
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "File Excel rỗng.");
    }

    #[test]
    fn processing_errors_embed_the_cause() {
        let err = ApiError::from_service(
            VisentError::Spreadsheet("Cannot detect file format".into()),
            BATCH_FAILURE_PREFIX,
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.message,
            "Đã xảy ra lỗi khi xử lý file: spreadsheet error: Cannot detect file format"
        );
    }

    #[test]
    fn inference_errors_are_internal() {
        let err = ApiError::from_service(
            VisentError::Inference("ONNX inference failed".into()),
            PREDICT_FAILURE_PREFIX,
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.starts_with(PREDICT_FAILURE_PREFIX));
    }
}
