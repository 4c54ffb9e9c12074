//! Tensor-runtime collaborator contract.
//!
//! [`MultiLayerPerceptronFilter`](super::MultiLayerPerceptronFilter) does not
//! load neural-network artifacts or own a tensor runtime itself: it is
//! handed a [`ModelLoader`] at construction and drives it through the
//! [`ModelRuntime`] contract at classification time. This keeps the filter
//! core free of any particular ML framework; a concrete backend (for
//! example the optional `tflite`-gated one) is injected by the caller.

use std::fmt;
use std::str::FromStr;

use crate::error::{ClassificationFault, ConfigError};

/// Compute device a loaded model runs on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Device {
    Cpu,
    Cuda(u32),
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(index) => write!(f, "cuda:{index}"),
        }
    }
}

impl FromStr for Device {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "cpu" {
            Ok(Device::Cpu)
        } else if s == "cuda" {
            Ok(Device::Cuda(0))
        } else if let Some(index) = s.strip_prefix("cuda:") {
            index
                .parse::<u32>()
                .map(Device::Cuda)
                .map_err(|_| ConfigError::InvalidDevice(s.to_string()))
        } else {
            Err(ConfigError::InvalidDevice(s.to_string()))
        }
    }
}

/// A loaded model capable of batched forward inference.
///
/// `forward` receives a row-major `rows x cols` feature matrix and returns
/// one output row per input row; only the first output column is consulted
/// by the filter, matching the single-score classification contract.
pub trait ModelRuntime {
    fn forward(&self, input: &[f32], rows: usize, cols: usize) -> Result<Vec<Vec<f32>>, ClassificationFault>;
}

/// Produces a [`ModelRuntime`] for a model artifact on a requested device.
///
/// Implementations report a failed load as `Err(String)` with a
/// human-readable reason; the filter wraps this into a [`crate::error::ModelLoadError`]
/// and performs the one-shot CPU fallback described in the filter's
/// construction contract.
pub trait ModelLoader {
    fn load(&self, path: &std::path::Path, device: &Device) -> Result<Box<dyn ModelRuntime>, String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_parses_cpu_and_cuda_forms() {
        assert_eq!("cpu".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!("cuda".parse::<Device>().unwrap(), Device::Cuda(0));
        assert_eq!("cuda:3".parse::<Device>().unwrap(), Device::Cuda(3));
    }

    #[test]
    fn device_rejects_malformed_descriptors() {
        assert!("gpu".parse::<Device>().is_err());
        assert!("cuda:".parse::<Device>().is_err());
        assert!("cuda:x".parse::<Device>().is_err());
    }

    #[test]
    fn device_display_round_trips_through_from_str() {
        for d in [Device::Cpu, Device::Cuda(0), Device::Cuda(7)] {
            let rendered = d.to_string();
            assert_eq!(rendered.parse::<Device>().unwrap(), d);
        }
    }
}
