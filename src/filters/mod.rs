//! The six streaming noise classifiers.
//!
//! Each filter implements [`crate::filter::Denoiser`] and owns its state
//! independently: two freshly constructed instances of the same filter,
//! fed the same parameters and the same input, always agree.

pub mod double_window;
pub mod event_flow;
pub mod khodamoradi;
pub mod mlp;
pub mod reclusive;
pub mod time_surface;
pub mod yang;

pub use double_window::{DoubleWindowConfig, DoubleWindowFilter};
pub use event_flow::{EventFlowConfig, EventFlowFilter};
pub use khodamoradi::{KhodamoradiConfig, KhodamoradiDenoiser};
pub use mlp::{Device as MlpDevice, MlpConfig, ModelLoader, ModelRuntime, MultiLayerPerceptronFilter};
pub use reclusive::{ReclusiveConfig, ReclusiveEventDenoisor};
pub use time_surface::{TimeSurfaceConfig, TimeSurfaceDenoisor};
pub use yang::{YangConfig, YangNoiseFilter};
