//! Public types for the Visent API.

mod classification;
mod variant;

pub use classification::{ClassificationResult, Prediction};
pub use variant::SentimentVariant;
