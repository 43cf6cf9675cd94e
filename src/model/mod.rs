//! Model location and device configuration for local inference.

pub mod device;
#[cfg(feature = "local-inference")]
pub mod source;

pub use device::Device;
#[cfg(feature = "local-inference")]
pub use source::{ModelFiles, ModelSource};
