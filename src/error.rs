//! Error taxonomy for filter construction and classification.
//!
//! Every filter is infallible once constructed, with the exception of the
//! internal, self-handled classification fault raised by
//! [`crate::filters::mlp`]'s model collaborator. Construction is the only
//! place a caller needs to handle an error.

use thiserror::Error;

/// Raised when filter parameters are inconsistent or out of range.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sensor geometry must be non-zero in both dimensions, got {width}x{height}")]
    InvalidGeometry { width: u16, height: u16 },

    #[error("{name} must be positive, got {value}")]
    NonPositiveParam { name: &'static str, value: f64 },

    #[error("invalid device descriptor: {0:?}")]
    InvalidDevice(String),
}

/// Raised when [`crate::filters::mlp::MultiLayerPerceptronFilter`] cannot obtain a
/// usable model at construction time.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to load model at {path} on {device}: {reason}")]
    Load {
        path: String,
        device: String,
        reason: String,
    },

    #[error("failed to load model at {path} on {device} and the CPU fallback also failed: {reason}")]
    FallbackFailed {
        path: String,
        device: String,
        reason: String,
    },
}

/// Raised by a [`crate::filters::mlp::ModelRuntime`] when a forward pass fails.
///
/// This never escapes [`crate::filters::mlp::MultiLayerPerceptronFilter`]: a
/// fault is caught and the whole offending batch is retained wholesale.
#[derive(Debug, Error)]
#[error("model forward pass failed: {0}")]
pub struct ClassificationFault(pub String);

/// Error raised while constructing [`crate::filters::mlp::MultiLayerPerceptronFilter`].
#[derive(Debug, Error)]
pub enum MlpfError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),
}
