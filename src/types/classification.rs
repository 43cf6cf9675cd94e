//! Classification output types.

use serde::{Deserialize, Serialize};

use super::SentimentVariant;
use crate::error::{Result, VisentError};

/// A single model prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Arg-max class index.
    pub index: usize,
    /// Label for `index` in the variant's table.
    pub label: &'static str,
    /// Softmax probability of the predicted class (0.0 to 1.0).
    pub confidence: f32,
}

impl Prediction {
    /// Build a prediction from one row of raw logits.
    ///
    /// The row width must match the variant's label count. On ties the
    /// lowest index wins.
    pub fn from_logits(logits: &[f32], variant: SentimentVariant) -> Result<Self> {
        if logits.len() != variant.num_labels() {
            return Err(VisentError::Inference(format!(
                "expected {} logits for {variant}, got {}",
                variant.num_labels(),
                logits.len()
            )));
        }

        let probs = softmax(logits);
        let (index, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, p)| {
                if p > best.1 { (i, p) } else { best }
            });

        if !confidence.is_finite() {
            return Err(VisentError::Inference(format!(
                "model produced non-finite logits for {variant}"
            )));
        }

        let label = variant.label(index).ok_or_else(|| {
            VisentError::Inference(format!("class index {index} out of range for {variant}"))
        })?;

        Ok(Self {
            index,
            label,
            confidence,
        })
    }
}

/// Per-comment result returned by the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The classified text, exactly as submitted.
    pub comment: String,
    /// Predicted label.
    pub sentiment: String,
    /// Probability of the predicted label.
    pub confidence: f32,
}

impl ClassificationResult {
    pub fn new(comment: impl Into<String>, prediction: &Prediction) -> Self {
        Self {
            comment: comment.into(),
            sentiment: prediction.label.to_string(),
            confidence: prediction.confidence,
        }
    }
}

/// Softmax function.
pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|x| x / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax() {
        let probs = softmax(&[1.0, 2.0, 3.0]);

        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1]);
        assert!(probs[1] > probs[0]);
    }

    #[test]
    fn softmax_is_stable_for_large_logits() {
        let probs = softmax(&[1000.0, 1001.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn prediction_picks_argmax_label() {
        let prediction =
            Prediction::from_logits(&[-1.0, 0.5, 3.0], SentimentVariant::ThreeClass).unwrap();
        assert_eq!(prediction.index, 2);
        assert_eq!(prediction.label, "Tích cực");
        assert!(prediction.confidence > 0.5 && prediction.confidence <= 1.0);
    }

    #[test]
    fn prediction_tie_takes_lowest_index() {
        let prediction =
            Prediction::from_logits(&[0.0; 5], SentimentVariant::FiveClass).unwrap();
        assert_eq!(prediction.index, 0);
        assert_eq!(prediction.label, "Rất tệ (1 sao)");
        assert!((prediction.confidence - 0.2).abs() < 1e-6);
    }

    #[test]
    fn prediction_rejects_wrong_width() {
        let err = Prediction::from_logits(&[0.1, 0.2, 0.3], SentimentVariant::FiveClass)
            .unwrap_err();
        assert!(matches!(err, VisentError::Inference(_)));
        assert!(err.to_string().contains("expected 5 logits"));
    }

    #[test]
    fn prediction_rejects_nan_logits() {
        let err = Prediction::from_logits(&[f32::NAN, 0.0, 1.0], SentimentVariant::ThreeClass)
            .unwrap_err();
        assert!(matches!(err, VisentError::Inference(_)));
    }

    #[test]
    fn result_serializes_vietnamese_literally() {
        let prediction =
            Prediction::from_logits(&[0.0, 4.0, 0.0], SentimentVariant::ThreeClass).unwrap();
        let result = ClassificationResult::new("Sản phẩm bình thường", &prediction);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("Sản phẩm bình thường"));
        assert!(json.contains("Bình thường"));
        assert!(!json.contains("\\u"));
    }
}
