//! Device configuration for local inference.

use std::str::FromStr;

use crate::error::{Result, VisentError};

/// Compute device for local inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    /// CPU execution (default).
    #[default]
    Cpu,

    /// CUDA GPU execution.
    #[cfg(feature = "cuda")]
    Cuda {
        /// GPU device ID (0-indexed).
        device_id: u32,
    },
}

impl Device {
    /// Create CPU device.
    pub fn cpu() -> Self {
        Self::Cpu
    }

    /// Create CUDA device with the given device ID.
    #[cfg(feature = "cuda")]
    pub fn cuda(device_id: u32) -> Self {
        Self::Cuda { device_id }
    }

    /// Get the device name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            #[cfg(feature = "cuda")]
            Self::Cuda { .. } => "CUDA",
        }
    }
}

impl FromStr for Device {
    type Err = VisentError;

    /// Parse a config value: `"cpu"`, `"cuda"` or `"cuda:<id>"`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            #[cfg(feature = "cuda")]
            "cuda" => Ok(Self::Cuda { device_id: 0 }),
            #[cfg(feature = "cuda")]
            other if other.starts_with("cuda:") => other[5..]
                .parse()
                .map(|device_id| Self::Cuda { device_id })
                .map_err(|e| VisentError::Configuration(format!("Invalid CUDA device id: {e}"))),
            other => Err(VisentError::Configuration(format!(
                "Unsupported device '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_cpu() {
        assert_eq!(Device::default(), Device::Cpu);
    }

    #[test]
    fn cpu_name() {
        assert_eq!(Device::cpu().name(), "CPU");
    }

    #[test]
    fn parse_cpu() {
        assert_eq!(" CPU ".parse::<Device>().unwrap(), Device::Cpu);
    }

    #[test]
    fn parse_unknown_device_fails() {
        let err = "tpu".parse::<Device>().unwrap_err();
        assert!(err.to_string().contains("Unsupported device"));
    }

    #[cfg(feature = "cuda")]
    #[test]
    fn parse_cuda_with_id() {
        assert_eq!("cuda:1".parse::<Device>().unwrap(), Device::cuda(1));
        assert_eq!("cuda".parse::<Device>().unwrap(), Device::cuda(0));
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn parse_cuda_without_feature_fails() {
        assert!("cuda".parse::<Device>().is_err());
    }
}
