//! Streaming noise classifiers for dynamic vision sensor (event camera)
//! change-detection events.
//!
//! Six independent, stateful classifiers ([`filters`]) each implement the
//! shared [`Denoiser`] contract: decide one event at a time using only
//! state derived from strictly prior events, then update that state. A
//! default batch driver on the trait offers a whole sequence through the
//! same per-event decision, preserving order.
//!
//! Loading of pretrained neural-network artifacts and tensor runtimes for
//! [`filters::mlp`] is out of scope here: the model runtime is an injected
//! collaborator (see [`filters::mlp::ModelRuntime`]), not something this
//! crate owns.

pub mod error;
pub mod event;
pub mod filter;
pub mod filters;

pub use error::{ClassificationFault, ConfigError, MlpfError, ModelLoadError};
pub use event::{Event, Geometry, Polarity};
pub use filter::Denoiser;
