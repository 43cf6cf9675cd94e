//! Sentiment classifier implementations.
//!
//! Providers implement [`SentimentClassifier`] for one model variant each.
//! The ONNX Runtime provider is the production backend; anything else
//! implementing the trait (e.g. a fixed-output classifier in tests) can be
//! plugged into the [`InferenceService`](crate::service::InferenceService).

pub mod traits;

#[cfg(feature = "local-inference")]
pub mod onnx_sentiment;

pub use traits::SentimentClassifier;

#[cfg(feature = "local-inference")]
pub use onnx_sentiment::{OnnxModelConfig, OnnxSentimentProvider};
