//! Provider trait for sentiment classification backends.

use crate::Result;
use crate::types::{Prediction, SentimentVariant};

/// A loaded classifier serving exactly one [`SentimentVariant`].
///
/// Calls are synchronous and may block for the duration of a forward pass.
/// Implementations must be shareable across request handlers.
pub trait SentimentClassifier: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// The label set this classifier predicts over.
    fn variant(&self) -> SentimentVariant;

    /// Classify a single text.
    fn classify(&self, text: &str) -> Result<Prediction>;
}
