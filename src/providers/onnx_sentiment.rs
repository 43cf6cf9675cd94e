//! Local sentiment inference via ONNX Runtime.
//!
//! Runs a sequence-classification export (PhoBERT fine-tunes by default)
//! and maps the arg-max class through the variant's fixed label table.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use super::SentimentClassifier;
use crate::error::{Result, VisentError};
use crate::model::{Device, ModelSource};
use crate::telemetry;
use crate::types::{Prediction, SentimentVariant};

/// Default maximum sequence length in tokens.
pub const DEFAULT_MAX_LENGTH: usize = 256;

/// How to load one classifier.
#[derive(Debug, Clone)]
pub struct OnnxModelConfig {
    /// Where the ONNX graph and tokenizer come from.
    pub source: ModelSource,
    /// Inputs longer than this are truncated.
    pub max_length: usize,
    /// Whether the graph takes a `token_type_ids` input (BERT does, RoBERTa/PhoBERT does not).
    pub token_type_ids: bool,
}

impl OnnxModelConfig {
    pub fn new(source: ModelSource) -> Self {
        Self {
            source,
            max_length: DEFAULT_MAX_LENGTH,
            token_type_ids: false,
        }
    }
}

/// Local sentiment classifier using ONNX Runtime.
pub struct OnnxSentimentProvider {
    // ort needs exclusive access for each run
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    variant: SentimentVariant,
    name: String,
    token_type_ids: bool,
}

impl OnnxSentimentProvider {
    /// Load a classifier for `variant`.
    ///
    /// Downloads the model if not cached locally.
    pub fn new(variant: SentimentVariant, config: &OnnxModelConfig, device: Device) -> Result<Self> {
        let name = config.source.name();
        info!(%variant, model = %name, device = device.name(), "loading sentiment model");

        let files = config.source.resolve()?;
        let session = build_session(&files.model, &device)?;
        let tokenizer = load_tokenizer(&files.tokenizer, config.max_length)?;

        info!(%variant, model = %name, "sentiment model loaded");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            variant,
            name,
            token_type_ids: config.token_type_ids,
        })
    }

    /// Encode a single text for the model.
    fn encode(&self, text: &str) -> Result<(Vec<i64>, Vec<i64>, Vec<i64>)> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| VisentError::Inference(format!("Tokenization failed: {}", e)))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&t| t as i64)
            .collect();

        Ok((input_ids, attention_mask, token_type_ids))
    }

    /// Run the ONNX session and return the first row of logits.
    fn run_inference(
        &self,
        input_ids: &[i64],
        attention_mask: &[i64],
        token_type_ids: Option<&[i64]>,
    ) -> Result<Vec<f32>> {
        use ort::value::TensorRef;

        let shape = [1_usize, input_ids.len()];

        let input_ids_tensor = TensorRef::from_array_view((shape, input_ids)).map_err(|e| {
            VisentError::Inference(format!("Failed to create input_ids tensor: {}", e))
        })?;

        let attention_mask_tensor =
            TensorRef::from_array_view((shape, attention_mask)).map_err(|e| {
                VisentError::Inference(format!("Failed to create attention_mask tensor: {}", e))
            })?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| VisentError::Inference(format!("Session lock poisoned: {}", e)))?;

        let outputs = if let Some(type_ids) = token_type_ids {
            let token_type_ids_tensor =
                TensorRef::from_array_view((shape, type_ids)).map_err(|e| {
                    VisentError::Inference(format!(
                        "Failed to create token_type_ids tensor: {}",
                        e
                    ))
                })?;
            session
                .run(ort::inputs![
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor,
                ])
                .map_err(|e| VisentError::Inference(format!("ONNX inference failed: {}", e)))?
        } else {
            session
                .run(ort::inputs![
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                ])
                .map_err(|e| VisentError::Inference(format!("ONNX inference failed: {}", e)))?
        };

        let logits = outputs
            .get("logits")
            .ok_or_else(|| VisentError::Inference("No logits output found".to_string()))?;

        // try_extract_tensor returns (&Shape, &[T])
        let (tensor_shape, logits_data) = logits
            .try_extract_tensor::<f32>()
            .map_err(|e| VisentError::Inference(format!("Failed to extract logits: {}", e)))?;

        let num_labels = tensor_shape
            .last()
            .copied()
            .ok_or_else(|| VisentError::Inference("Logits tensor has no dimensions".to_string()))?
            as usize;

        if logits_data.len() < num_labels {
            return Err(VisentError::Inference(format!(
                "Logits tensor too small: {} values for {} labels",
                logits_data.len(),
                num_labels
            )));
        }

        Ok(logits_data[..num_labels].to_vec())
    }
}

impl SentimentClassifier for OnnxSentimentProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn variant(&self) -> SentimentVariant {
        self.variant
    }

    fn classify(&self, text: &str) -> Result<Prediction> {
        let start = Instant::now();

        let (input_ids, attention_mask, token_type_ids) = self.encode(text)?;
        let type_ids = self.token_type_ids.then_some(token_type_ids.as_slice());
        let logits = self.run_inference(&input_ids, &attention_mask, type_ids)?;
        let prediction = Prediction::from_logits(&logits, self.variant)?;

        let elapsed = start.elapsed();
        metrics::histogram!(
            telemetry::INFERENCE_DURATION_SECONDS,
            "variant" => self.variant.as_str(),
        )
        .record(elapsed.as_secs_f64());
        debug!(
            variant = %self.variant,
            tokens = input_ids.len(),
            label = prediction.label,
            confidence = prediction.confidence,
            elapsed_ms = elapsed.as_millis() as u64,
            "classified text"
        );

        Ok(prediction)
    }
}

/// Load a tokenizer and cap its sequence length.
fn load_tokenizer(path: &Path, max_length: usize) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path).map_err(|e| {
        VisentError::Configuration(format!("Failed to load tokenizer from {:?}: {}", path, e))
    })?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| VisentError::Configuration(format!("Failed to set truncation: {}", e)))?;
    // single sequences never need padding
    tokenizer.with_padding(None);

    Ok(tokenizer)
}

/// Build an ONNX session with the appropriate execution provider.
fn build_session(model_path: &Path, device: &Device) -> Result<Session> {
    let builder = Session::builder()
        .map_err(|e| VisentError::Configuration(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| VisentError::Configuration(format!("Failed to set optimization level: {}", e)))?;

    let mut builder = match device {
        Device::Cpu => builder,
        #[cfg(feature = "cuda")]
        Device::Cuda { device_id } => {
            use ort::execution_providers::CUDAExecutionProvider;
            builder
                .with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(*device_id as i32)
                    .build()])
                .map_err(|e| {
                    VisentError::Configuration(format!("Failed to configure CUDA: {}", e))
                })?
        }
    };

    builder
        .commit_from_file(model_path)
        .map_err(|e| VisentError::Configuration(format!("Failed to load ONNX model: {}", e)))
}
