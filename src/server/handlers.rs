//! Route handlers.
//!
//! Validation runs check by check and stops at the first failure, so the
//! client always gets exactly one message. Inference runs on tokio's
//! blocking pool; batch rows are classified one after another inside a
//! single blocking task.

use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use super::AppState;
use super::error::{ApiError, BATCH_FAILURE_PREFIX, PREDICT_FAILURE_PREFIX};
use crate::error::VisentError;
use crate::spreadsheet;
use crate::telemetry;
use crate::types::{ClassificationResult, SentimentVariant};

pub const WELCOME_MESSAGE: &str = "Chào mừng đến với API Phân tích Cảm xúc!";

pub const TEXT_REQUIRED: &str = "Vui lòng cung cấp trường 'text' trong request body.";
pub const TYPE_REQUIRED: &str = "Vui lòng cung cấp trường 'type' trong request body.";
pub const TYPE_INVALID: &str = "Trường 'type' không hợp lệ (3sentiment hoặc 5sentiment).";

pub const FILE_REQUIRED: &str = "Không tìm thấy file trong request (key phải là 'file').";
pub const FORM_TYPE_REQUIRED: &str =
    "Vui lòng cung cấp trường 'type' (3sentiment hoặc 5sentiment) trong form data.";
pub const FILE_NOT_SELECTED: &str = "Chưa chọn file nào.";
pub const FILE_FORMAT_INVALID: &str =
    "Định dạng file không hợp lệ. Vui lòng sử dụng file .xlsx hoặc .xls.";

/// Multipart field carrying the workbook.
pub const FILE_FIELD: &str = "file";

/// Field carrying the sentiment type, in both JSON and form bodies.
pub const TYPE_FIELD: &str = "type";

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    let variants: Vec<&str> = SentimentVariant::ALL.iter().map(|v| v.as_str()).collect();
    Json(json!({
        "status": "ok",
        "version": crate::version_string(),
        "variants": variants,
    }))
}

/// Body of `POST /predict`.
///
/// Fields stay raw JSON so that a value of the wrong type fails its own
/// check instead of the whole parse.
#[derive(Debug, Default, Deserialize)]
struct PredictRequest {
    #[serde(default)]
    text: Option<Value>,
    #[serde(default, rename = "type")]
    kind: Option<Value>,
}

impl PredictRequest {
    /// Parse a request body. Any JSON that is not an object has no fields.
    fn from_json(body: &[u8]) -> crate::Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// `POST /predict`
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ClassificationResult>, ApiError> {
    let result = predict_inner(state, body).await;
    record("/predict", &result);
    result.map(Json)
}

async fn predict_inner(
    state: AppState,
    body: Result<Bytes, BytesRejection>,
) -> Result<ClassificationResult, ApiError> {
    let body = body.map_err(|e| {
        warn!(error = %e, "unreadable predict body");
        ApiError {
            status: e.status(),
            message: e.body_text(),
        }
    })?;
    let request = PredictRequest::from_json(&body).map_err(|e| {
        warn!(error = %e, "predict body is not JSON");
        ApiError::bad_request(TEXT_REQUIRED)
    })?;

    let text = match request.text {
        Some(Value::String(text)) if !text.trim().is_empty() => text,
        _ => return Err(reject(TEXT_REQUIRED)),
    };
    let variant = match request.kind {
        None | Some(Value::Null) => return Err(reject(TYPE_REQUIRED)),
        Some(Value::String(kind)) => parse_variant(Some(&kind), TYPE_REQUIRED, TYPE_INVALID)?,
        Some(_) => return Err(reject(TYPE_INVALID)),
    };

    debug!(%variant, chars = text.chars().count(), "predict");

    let service = state.service.clone();
    let outcome = tokio::task::spawn_blocking(move || service.classify(&text, variant))
        .await
        .map_err(|e| {
            error!(error = %e, "predict task failed");
            ApiError::internal(format!("{PREDICT_FAILURE_PREFIX}: {e}"))
        })?;

    outcome.map_err(|e| {
        error!(%variant, error = %e, "predict failed");
        ApiError::from_service(e, PREDICT_FAILURE_PREFIX)
    })
}

/// An uploaded file part.
struct Upload {
    filename: String,
    bytes: Bytes,
}

/// `POST /predict-batch`
pub async fn predict_batch(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<ClassificationResult>>, ApiError> {
    let result = predict_batch_inner(state, multipart).await;
    record("/predict-batch", &result);
    result.map(Json)
}

async fn predict_batch_inner(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Vec<ClassificationResult>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        warn!(error = %e, "batch request is not multipart");
        ApiError::bad_request(FILE_REQUIRED)
    })?;

    let mut upload: Option<Upload> = None;
    let mut kind: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            // a part without a filename is a plain form value, not a file
            Some(FILE_FIELD) if upload.is_none() => {
                if let Some(filename) = field.file_name().map(str::to_owned) {
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    upload = Some(Upload { filename, bytes });
                }
            }
            Some(TYPE_FIELD) if kind.is_none() => {
                kind = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let Some(upload) = upload else {
        return Err(reject(FILE_REQUIRED));
    };
    let variant = parse_variant(kind.as_deref(), FORM_TYPE_REQUIRED, FORM_TYPE_REQUIRED)?;
    if upload.filename.is_empty() {
        return Err(reject(FILE_NOT_SELECTED));
    }
    if !spreadsheet::is_supported_filename(&upload.filename) {
        return Err(reject(FILE_FORMAT_INVALID));
    }

    info!(
        %variant,
        filename = %upload.filename,
        bytes = upload.bytes.len(),
        "batch upload received"
    );

    let service = state.service.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let column = spreadsheet::read_comments(&upload.bytes)?;
        debug!(
            header = column.header.as_deref().unwrap_or(""),
            data_rows = column.data_rows,
            comments = column.comments.len(),
            "workbook read"
        );
        service.classify_batch(column.comments, variant)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "batch task failed");
        ApiError::internal(format!("{BATCH_FAILURE_PREFIX}: {e}"))
    })?;

    outcome
        .inspect(|results| info!(%variant, rows = results.len(), "batch classified"))
        .map_err(|e| {
            if e.is_client_error() {
                warn!(error = %e, "batch rejected");
            } else {
                error!(%variant, error = %e, "batch failed");
            }
            ApiError::from_service(e, BATCH_FAILURE_PREFIX)
        })
}

/// Parse a `type` value, distinguishing missing/blank from unrecognized.
fn parse_variant(
    raw: Option<&str>,
    missing: &str,
    invalid: &str,
) -> Result<SentimentVariant, ApiError> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Err(reject(missing)),
    };
    raw.parse().map_err(|e: VisentError| {
        debug!(error = %e, "bad sentiment type");
        reject(invalid)
    })
}

fn reject(message: &str) -> ApiError {
    warn!(reason = message, "request rejected");
    ApiError::bad_request(message)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    warn!(error = %err, "malformed multipart body");
    ApiError {
        status: err.status(),
        message: err.body_text(),
    }
}

fn record<T>(endpoint: &'static str, result: &Result<T, ApiError>) {
    let status = match result {
        Ok(_) => StatusCode::OK,
        Err(err) => err.status,
    };
    metrics::counter!(
        telemetry::REQUESTS_TOTAL,
        "endpoint" => endpoint,
        "status" => status.as_u16().to_string(),
    )
    .increment(1);
}
