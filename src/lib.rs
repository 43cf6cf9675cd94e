//! Visent - Vietnamese sentiment classification service
//!
//! Serves two PhoBERT sentiment classifiers over HTTP: a 3-class model
//! (negative / neutral / positive) and a 5-class model (one to five stars).
//! Single texts arrive as JSON; batches arrive as an Excel workbook whose
//! first column holds one comment per row.
//!
//! # Library Example
//!
//! ```rust,no_run
//! use visent::{InferenceService, SentimentVariant};
//! use visent::model::{Device, ModelSource};
//! use visent::providers::OnnxModelConfig;
//!
//! fn main() -> visent::Result<()> {
//!     let service = InferenceService::from_onnx(
//!         &OnnxModelConfig::new(ModelSource::huggingface("phongnt251199/phobert-sentiment-reviews-v5")),
//!         &OnnxModelConfig::new(ModelSource::huggingface("phongnt251199/phobert-sentiment-reviews-v4")),
//!         Device::Cpu,
//!     )?;
//!
//!     let result = service.classify("Sản phẩm rất tốt", SentimentVariant::ThreeClass)?;
//!     println!("{} ({:.2})", result.sentiment, result.confidence);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod model;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod service;
pub mod spreadsheet;
pub mod telemetry;
pub mod types;
mod version;

// Re-export main types at crate root
pub use error::{Result, VisentError};
pub use providers::SentimentClassifier;
pub use service::InferenceService;
pub use types::{ClassificationResult, Prediction, SentimentVariant};
pub use version::{PKG_VERSION, version_string};
