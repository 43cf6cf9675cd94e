//! Visent error types

/// Visent error types
#[derive(Debug, thiserror::Error)]
pub enum VisentError {
    // Client input errors
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    EmptyInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Processing errors
    #[error("inference error: {0}")]
    Inference(String),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl VisentError {
    /// Whether the error was caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::EmptyInput(_) | Self::Json(_)
        )
    }
}

impl From<calamine::Error> for VisentError {
    fn from(err: calamine::Error) -> Self {
        VisentError::Spreadsheet(err.to_string())
    }
}

/// Result type alias for Visent operations
pub type Result<T> = std::result::Result<T, VisentError>;
