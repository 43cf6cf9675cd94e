//! Model source and download logic.

use std::path::PathBuf;

use crate::error::{Result, VisentError};

/// Default ONNX export location inside a Hub repository.
pub const DEFAULT_MODEL_FILE: &str = "onnx/model.onnx";

/// Default tokenizer file inside a Hub repository.
pub const DEFAULT_TOKENIZER_FILE: &str = "tokenizer.json";

/// Source for a classifier model and its tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Load from a HuggingFace Hub repository.
    HuggingFace {
        /// Repository ID (e.g., "phongnt251199/phobert-sentiment-reviews-v5").
        repo_id: String,
        /// ONNX graph path within the repo.
        model_file: String,
        /// Tokenizer path within the repo.
        tokenizer_file: String,
    },

    /// Load from local files.
    Local {
        model_path: PathBuf,
        tokenizer_path: PathBuf,
    },
}

/// Resolved on-disk locations of a model and its tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
}

impl ModelSource {
    /// Create a HuggingFace source using the default file layout.
    pub fn huggingface(repo_id: impl Into<String>) -> Self {
        Self::HuggingFace {
            repo_id: repo_id.into(),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            tokenizer_file: DEFAULT_TOKENIZER_FILE.to_string(),
        }
    }

    /// Create a local source.
    pub fn local(model_path: impl Into<PathBuf>, tokenizer_path: impl Into<PathBuf>) -> Self {
        Self::Local {
            model_path: model_path.into(),
            tokenizer_path: tokenizer_path.into(),
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> String {
        match self {
            Self::HuggingFace { repo_id, .. } => repo_id.clone(),
            Self::Local { model_path, .. } => model_path.display().to_string(),
        }
    }

    /// Download or resolve the model files to local paths.
    ///
    /// For HuggingFace sources, downloads the files if not cached.
    /// For local sources, checks that both files exist.
    pub fn resolve(&self) -> Result<ModelFiles> {
        match self {
            Self::HuggingFace {
                repo_id,
                model_file,
                tokenizer_file,
            } => {
                let api = hf_hub::api::sync::Api::new().map_err(|e| {
                    VisentError::Configuration(format!("Failed to initialize HF API: {}", e))
                })?;

                let repo = api.model(repo_id.clone());

                let model = repo.get(model_file).map_err(|e| {
                    VisentError::Configuration(format!(
                        "Failed to download {} from {}: {}",
                        model_file, repo_id, e
                    ))
                })?;

                let tokenizer = repo.get(tokenizer_file).map_err(|e| {
                    VisentError::Configuration(format!(
                        "Failed to download {} from {}: {}",
                        tokenizer_file, repo_id, e
                    ))
                })?;

                Ok(ModelFiles { model, tokenizer })
            }
            Self::Local {
                model_path,
                tokenizer_path,
            } => {
                for path in [model_path, tokenizer_path] {
                    if !path.exists() {
                        return Err(VisentError::Configuration(format!(
                            "Local model path does not exist: {}",
                            path.display()
                        )));
                    }
                }
                Ok(ModelFiles {
                    model: model_path.clone(),
                    tokenizer: tokenizer_path.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huggingface_uses_default_layout() {
        let source = ModelSource::huggingface("org/model");
        assert_eq!(
            source,
            ModelSource::HuggingFace {
                repo_id: "org/model".into(),
                model_file: "onnx/model.onnx".into(),
                tokenizer_file: "tokenizer.json".into(),
            }
        );
        assert_eq!(source.name(), "org/model");
    }

    #[test]
    fn missing_local_files_fail_to_resolve() {
        let source = ModelSource::local("/nonexistent/model.onnx", "/nonexistent/tokenizer.json");
        let err = source.resolve().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/model.onnx"));
    }
}
