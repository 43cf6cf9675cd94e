//! The inference service shared by all request handlers.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, VisentError};
use crate::providers::SentimentClassifier;
use crate::telemetry;
use crate::types::{ClassificationResult, SentimentVariant};

/// Both sentiment classifiers, loaded once at startup.
///
/// Cheap to share: wrap in an `Arc` and hand to the HTTP layer.
pub struct InferenceService {
    three_class: Arc<dyn SentimentClassifier>,
    five_class: Arc<dyn SentimentClassifier>,
}

impl InferenceService {
    /// Assemble a service from already-loaded classifiers.
    ///
    /// Fails if a classifier is registered under the wrong variant.
    pub fn new(
        three_class: Arc<dyn SentimentClassifier>,
        five_class: Arc<dyn SentimentClassifier>,
    ) -> Result<Self> {
        for (expected, classifier) in [
            (SentimentVariant::ThreeClass, &three_class),
            (SentimentVariant::FiveClass, &five_class),
        ] {
            if classifier.variant() != expected {
                return Err(VisentError::Configuration(format!(
                    "classifier '{}' serves {} but was registered for {}",
                    classifier.name(),
                    classifier.variant(),
                    expected
                )));
            }
        }

        Ok(Self {
            three_class,
            five_class,
        })
    }

    /// Load both ONNX classifiers. Any failure is fatal for the caller.
    #[cfg(feature = "local-inference")]
    pub fn from_onnx(
        three_class: &crate::providers::OnnxModelConfig,
        five_class: &crate::providers::OnnxModelConfig,
        device: crate::model::Device,
    ) -> Result<Self> {
        use crate::providers::OnnxSentimentProvider;

        let three = OnnxSentimentProvider::new(SentimentVariant::ThreeClass, three_class, device)?;
        let five = OnnxSentimentProvider::new(SentimentVariant::FiveClass, five_class, device)?;

        tracing::info!("all sentiment models loaded");
        Self::new(Arc::new(three), Arc::new(five))
    }

    /// The classifier serving `variant`.
    pub fn classifier(&self, variant: SentimentVariant) -> &dyn SentimentClassifier {
        match variant {
            SentimentVariant::ThreeClass => self.three_class.as_ref(),
            SentimentVariant::FiveClass => self.five_class.as_ref(),
        }
    }

    /// Classify one text.
    pub fn classify(&self, text: &str, variant: SentimentVariant) -> Result<ClassificationResult> {
        let prediction = self.classifier(variant).classify(text)?;
        metrics::counter!(telemetry::CLASSIFICATIONS_TOTAL, "variant" => variant.as_str())
            .increment(1);
        Ok(ClassificationResult::new(text, &prediction))
    }

    /// Classify comments one after another, preserving order.
    ///
    /// Stops at the first failure; no partial results are returned.
    pub fn classify_batch(
        &self,
        comments: Vec<String>,
        variant: SentimentVariant,
    ) -> Result<Vec<ClassificationResult>> {
        let classifier = self.classifier(variant);
        let total = comments.len();
        let mut results = Vec::with_capacity(total);

        for (row, comment) in comments.into_iter().enumerate() {
            let prediction = classifier.classify(&comment).map_err(|e| {
                debug!(row, total, error = %e, "batch row failed");
                e
            })?;
            results.push(ClassificationResult::new(comment, &prediction));
        }

        metrics::counter!(telemetry::CLASSIFICATIONS_TOTAL, "variant" => variant.as_str())
            .increment(total as u64);
        metrics::counter!(telemetry::BATCH_ROWS_TOTAL, "variant" => variant.as_str())
            .increment(total as u64);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Prediction;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Predicts the class given by text length, modulo label count.
    struct LengthClassifier {
        variant: SentimentVariant,
        calls: AtomicUsize,
    }

    impl LengthClassifier {
        fn new(variant: SentimentVariant) -> Arc<Self> {
            Arc::new(Self {
                variant,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl SentimentClassifier for LengthClassifier {
        fn name(&self) -> &str {
            "length"
        }

        fn variant(&self) -> SentimentVariant {
            self.variant
        }

        fn classify(&self, text: &str) -> Result<Prediction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text == "boom" {
                return Err(VisentError::Inference("boom".into()));
            }
            let mut logits = vec![0.0; self.variant.num_labels()];
            logits[text.chars().count() % self.variant.num_labels()] = 5.0;
            Prediction::from_logits(&logits, self.variant)
        }
    }

    fn service() -> (InferenceService, Arc<LengthClassifier>, Arc<LengthClassifier>) {
        let three = LengthClassifier::new(SentimentVariant::ThreeClass);
        let five = LengthClassifier::new(SentimentVariant::FiveClass);
        let service = InferenceService::new(three.clone(), five.clone()).unwrap();
        (service, three, five)
    }

    #[test]
    fn rejects_swapped_classifiers() {
        let three = LengthClassifier::new(SentimentVariant::ThreeClass);
        let five = LengthClassifier::new(SentimentVariant::FiveClass);
        let result = InferenceService::new(five, three);
        assert!(matches!(result, Err(VisentError::Configuration(_))));
    }

    #[test]
    fn dispatches_by_variant() {
        let (service, three, five) = service();

        let result = service.classify("abc", SentimentVariant::FiveClass).unwrap();
        assert_eq!(result.comment, "abc");
        assert_eq!(result.sentiment, "Khá tốt (4 sao)");
        assert_eq!(three.calls.load(Ordering::SeqCst), 0);
        assert_eq!(five.calls.load(Ordering::SeqCst), 1);

        let result = service.classify("abc", SentimentVariant::ThreeClass).unwrap();
        assert_eq!(result.sentiment, "Tiêu cực");
        assert_eq!(three.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn batch_preserves_order() {
        let (service, _, _) = service();
        let comments = vec!["a".to_string(), "ab".to_string(), "abc".to_string()];

        let results = service
            .classify_batch(comments, SentimentVariant::ThreeClass)
            .unwrap();

        let sentiments: Vec<_> = results.iter().map(|r| r.sentiment.as_str()).collect();
        assert_eq!(sentiments, ["Bình thường", "Tích cực", "Tiêu cực"]);
        let texts: Vec<_> = results.iter().map(|r| r.comment.as_str()).collect();
        assert_eq!(texts, ["a", "ab", "abc"]);
    }

    #[test]
    fn batch_fails_fast() {
        let (service, three, _) = service();
        let comments = vec!["ok".to_string(), "boom".to_string(), "never".to_string()];

        let result = service.classify_batch(comments, SentimentVariant::ThreeClass);

        assert!(matches!(result, Err(VisentError::Inference(_))));
        assert_eq!(three.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_batch_is_empty() {
        let (service, _, _) = service();
        let results = service
            .classify_batch(Vec::new(), SentimentVariant::FiveClass)
            .unwrap();
        assert!(results.is_empty());
    }
}
