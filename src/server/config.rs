//! Configuration loading for visentd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag, must exist)
//! 2. `~/.visent/config.toml` (user)
//! 3. `/etc/visent/config.toml` (system)
//!
//! When no file is found the built-in defaults are used: bind
//! `0.0.0.0:8000` and load both PhoBERT sentiment models from the Hub.

use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::model::Device;
use crate::types::SentimentVariant;
use crate::{Result, VisentError};

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub models: ModelsConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:8000).
    #[serde(default = "default_address")]
    pub address: String,
    /// Largest accepted request body in bytes (default: 16 MiB).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

/// Inference runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    /// Device to use: "cpu" or "cuda" (default: "cpu").
    #[serde(default = "default_device")]
    pub device: String,
    /// Token limit applied to every model unless overridden (default: 256).
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            max_length: default_max_length(),
        }
    }
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_max_length() -> usize {
    256
}

/// One section per sentiment model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelsConfig {
    #[serde(default)]
    pub three_class: ModelConfig,
    #[serde(default)]
    pub five_class: ModelConfig,
}

impl ModelsConfig {
    pub fn get(&self, variant: SentimentVariant) -> &ModelConfig {
        match variant {
            SentimentVariant::ThreeClass => &self.three_class,
            SentimentVariant::FiveClass => &self.five_class,
        }
    }
}

/// Where to load one model from.
///
/// Local paths win over the Hub when both are set.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Hub repository (default depends on the variant).
    #[serde(default)]
    pub repo_id: Option<String>,
    /// ONNX graph path inside the repository.
    #[serde(default = "default_model_file")]
    pub model_file: String,
    /// Tokenizer path inside the repository.
    #[serde(default = "default_tokenizer_file")]
    pub tokenizer_file: String,
    /// Local ONNX graph.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    /// Local `tokenizer.json`.
    #[serde(default)]
    pub tokenizer_path: Option<PathBuf>,
    /// Feed `token_type_ids` to the graph (default: false).
    #[serde(default)]
    pub token_type_ids: bool,
    /// Per-model token limit.
    #[serde(default)]
    pub max_length: Option<usize>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            repo_id: None,
            model_file: default_model_file(),
            tokenizer_file: default_tokenizer_file(),
            model_path: None,
            tokenizer_path: None,
            token_type_ids: false,
            max_length: None,
        }
    }
}

fn default_model_file() -> String {
    "onnx/model.onnx".to_string()
}

fn default_tokenizer_file() -> String {
    "tokenizer.json".to_string()
}

/// Hub repository used when a model section names none.
pub fn default_repo_id(variant: SentimentVariant) -> &'static str {
    match variant {
        SentimentVariant::ThreeClass => "phongnt251199/phobert-sentiment-reviews-v5",
        SentimentVariant::FiveClass => "phongnt251199/phobert-sentiment-reviews-v4",
    }
}

#[cfg(feature = "local-inference")]
impl ModelConfig {
    /// Resolve this section into a model source.
    pub fn source(&self, variant: SentimentVariant) -> Result<crate::model::ModelSource> {
        use crate::model::ModelSource;

        match (&self.model_path, &self.tokenizer_path) {
            (Some(model), Some(tokenizer)) => Ok(ModelSource::local(model, tokenizer)),
            (None, None) => Ok(ModelSource::HuggingFace {
                repo_id: self
                    .repo_id
                    .clone()
                    .unwrap_or_else(|| default_repo_id(variant).to_string()),
                model_file: self.model_file.clone(),
                tokenizer_file: self.tokenizer_file.clone(),
            }),
            _ => Err(VisentError::Configuration(format!(
                "models.{}: model_path and tokenizer_path must be set together",
                section_name(variant)
            ))),
        }
    }

    /// Build the provider configuration, falling back to `default_max_length`.
    pub fn onnx_config(
        &self,
        variant: SentimentVariant,
        default_max_length: usize,
    ) -> Result<crate::providers::OnnxModelConfig> {
        let max_length = self.max_length.unwrap_or(default_max_length);
        if max_length == 0 {
            return Err(VisentError::Configuration(format!(
                "models.{}: max_length must be positive",
                section_name(variant)
            )));
        }

        Ok(crate::providers::OnnxModelConfig {
            source: self.source(variant)?,
            max_length,
            token_type_ids: self.token_type_ids,
        })
    }
}

#[cfg(feature = "local-inference")]
fn section_name(variant: SentimentVariant) -> &'static str {
    match variant {
        SentimentVariant::ThreeClass => "three_class",
        SentimentVariant::FiveClass => "five_class",
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.visent/config.toml`
    /// 3. `/etc/visent/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::info!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            VisentError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            VisentError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        tracing::info!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Resolve the config file path, if any.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(VisentError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".visent").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/visent/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Parsed bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.server.address.parse().map_err(|e| {
            VisentError::Configuration(format!(
                "Invalid address '{}': {e}",
                self.server.address
            ))
        })
    }

    /// Parsed inference device.
    pub fn device(&self) -> Result<Device> {
        self.inference.device.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.address, "0.0.0.0:8000");
        assert_eq!(config.server.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(config.inference.device, "cpu");
        assert_eq!(config.inference.max_length, 256);
        assert_eq!(config.models.three_class.model_file, "onnx/model.onnx");
        assert_eq!(config.socket_addr().unwrap().port(), 8000);
        assert_eq!(config.device().unwrap(), Device::Cpu);
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [server]
            address = "127.0.0.1:9000"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.address, "127.0.0.1:9000");
        // Defaults preserved
        assert_eq!(config.server.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(config.inference.max_length, 256);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            address = "0.0.0.0:8080"
            max_upload_bytes = 1048576

            [inference]
            device = "cpu"
            max_length = 128

            [models.three_class]
            repo_id = "acme/phobert-3"
            token_type_ids = true

            [models.five_class]
            model_path = "/opt/models/five/model.onnx"
            tokenizer_path = "/opt/models/five/tokenizer.json"
            max_length = 64
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.max_upload_bytes, 1048576);
        assert_eq!(config.inference.max_length, 128);
        assert_eq!(
            config.models.three_class.repo_id.as_deref(),
            Some("acme/phobert-3")
        );
        assert!(config.models.three_class.token_type_ids);
        assert_eq!(
            config.models.get(SentimentVariant::FiveClass).model_path,
            Some(PathBuf::from("/opt/models/five/model.onnx"))
        );
        assert_eq!(config.models.five_class.max_length, Some(64));
    }

    #[test]
    fn invalid_address_is_configuration_error() {
        let mut config = Config::default();
        config.server.address = "not an address".into();
        let err = config.socket_addr().unwrap_err();
        assert!(err.to_string().contains("Invalid address"));
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }

    #[cfg(feature = "local-inference")]
    mod sources {
        use crate::model::ModelSource;
        use crate::server::config::{Config, ModelConfig};
        use crate::types::SentimentVariant;

        #[test]
        fn missing_section_uses_default_repo() {
            let config = Config::default();
            let source = config
                .models
                .three_class
                .source(SentimentVariant::ThreeClass)
                .unwrap();
            assert_eq!(
                source,
                ModelSource::huggingface("phongnt251199/phobert-sentiment-reviews-v5")
            );

            let five = config
                .models
                .five_class
                .onnx_config(SentimentVariant::FiveClass, 256)
                .unwrap();
            assert_eq!(
                five.source,
                ModelSource::huggingface("phongnt251199/phobert-sentiment-reviews-v4")
            );
            assert_eq!(five.max_length, 256);
        }

        #[test]
        fn local_paths_take_precedence() {
            let model = ModelConfig {
                repo_id: Some("ignored/repo".into()),
                model_path: Some("/m.onnx".into()),
                tokenizer_path: Some("/t.json".into()),
                ..Default::default()
            };
            assert_eq!(
                model.source(SentimentVariant::FiveClass).unwrap(),
                ModelSource::local("/m.onnx", "/t.json")
            );
        }

        #[test]
        fn half_local_config_is_rejected() {
            let model = ModelConfig {
                model_path: Some("/m.onnx".into()),
                ..Default::default()
            };
            let err = model.source(SentimentVariant::ThreeClass).unwrap_err();
            assert!(err.to_string().contains("models.three_class"));
        }

        #[test]
        fn zero_max_length_is_rejected() {
            let model = ModelConfig {
                max_length: Some(0),
                ..Default::default()
            };
            assert!(model.onnx_config(SentimentVariant::ThreeClass, 256).is_err());
        }
    }
}
