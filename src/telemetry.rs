//! Telemetry metric name constants.
//!
//! Centralised metric names for visent operations. Deployments install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `visent_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `endpoint`: HTTP route (e.g. "/predict", "/predict-batch")
//! - `status`: HTTP status code as a string
//! - `variant`: sentiment type ("3sentiment" | "5sentiment")

/// Total HTTP requests handled.
///
/// Labels: `endpoint`, `status`.
pub const REQUESTS_TOTAL: &str = "visent_requests_total";

/// Duration of a single model forward pass in seconds.
///
/// Labels: `variant`.
pub const INFERENCE_DURATION_SECONDS: &str = "visent_inference_duration_seconds";

/// Total texts classified, single and batch combined.
///
/// Labels: `variant`.
pub const CLASSIFICATIONS_TOTAL: &str = "visent_classifications_total";

/// Total spreadsheet rows classified through the batch endpoint.
///
/// Labels: `variant`.
pub const BATCH_ROWS_TOTAL: &str = "visent_batch_rows_total";
