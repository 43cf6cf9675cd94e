//! Sentiment model variants and their label tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VisentError};

const THREE_CLASS_LABELS: &[&str] = &["Tiêu cực", "Bình thường", "Tích cực"];

const FIVE_CLASS_LABELS: &[&str] = &[
    "Rất tệ (1 sao)",
    "Tệ (2 sao)",
    "Bình thường (3 sao)",
    "Khá tốt (4 sao)",
    "Rất tốt (5 sao)",
];

/// Which sentiment model serves a request.
///
/// Selected by the `type` field of a request: `"3sentiment"` or `"5sentiment"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentVariant {
    /// Negative / neutral / positive.
    #[serde(rename = "3sentiment")]
    ThreeClass,
    /// One to five stars.
    #[serde(rename = "5sentiment")]
    FiveClass,
}

impl SentimentVariant {
    /// Every variant, in the order models are loaded at startup.
    pub const ALL: [SentimentVariant; 2] = [Self::ThreeClass, Self::FiveClass];

    /// Wire name used in the `type` request field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThreeClass => "3sentiment",
            Self::FiveClass => "5sentiment",
        }
    }

    /// Ordered label table; position is the model's class index.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::ThreeClass => THREE_CLASS_LABELS,
            Self::FiveClass => FIVE_CLASS_LABELS,
        }
    }

    /// Number of output classes the model must produce.
    pub fn num_labels(&self) -> usize {
        self.labels().len()
    }

    /// Label for a class index, if in range.
    pub fn label(&self, index: usize) -> Option<&'static str> {
        self.labels().get(index).copied()
    }
}

impl fmt::Display for SentimentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentVariant {
    type Err = VisentError;

    /// Parse a `type` value. Surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "3sentiment" => Ok(Self::ThreeClass),
            "5sentiment" => Ok(Self::FiveClass),
            other => Err(VisentError::InvalidInput(format!(
                "unknown sentiment type '{other}'"
            ))),
        }
    }
}
