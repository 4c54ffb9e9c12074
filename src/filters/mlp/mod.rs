//! Multi-layer perceptron filter (MLPF).
//!
//! The only classifier backed by an external model rather than a closed-form
//! rule. Builds a fixed 7x7x2 neighborhood feature patch per event (49
//! temporal + 49 polarity features) from a per-pixel time surface, batches
//! events up to a configured size, and classifies each batch through an
//! injected [`ModelRuntime`].

mod runtime;
#[cfg(feature = "tflite")]
mod tflite_backend;

pub use runtime::{Device, ModelLoader, ModelRuntime};
#[cfg(feature = "tflite")]
pub use tflite_backend::TfliteModelLoader;

use std::path::Path;

use crate::error::{ModelLoadError, MlpfError};
use crate::event::{Event, Geometry};
use crate::filter::Denoiser;

const PATCH_RADIUS: i32 = 3;
const PATCH_SIDE: usize = 7;
const PATCH_AREA: usize = PATCH_SIDE * PATCH_SIDE; // 49
const PATCH_VOLUME: usize = PATCH_AREA * 2; // 98

#[derive(Debug, Clone, PartialEq)]
pub struct MlpConfig {
    pub batch_size: usize,
    pub duration: f64,
    pub float_threshold: f64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            batch_size: 5_000,
            duration: 100_000.0,
            float_threshold: 0.8,
        }
    }
}

fn neighborhood_offsets() -> Vec<(i32, i32)> {
    let mut offsets = Vec::with_capacity(PATCH_AREA);
    for dy in -PATCH_RADIUS..=PATCH_RADIUS {
        for dx in -PATCH_RADIUS..=PATCH_RADIUS {
            offsets.push((dy, dx));
        }
    }
    offsets
}

pub struct MultiLayerPerceptronFilter {
    geometry: Geometry,
    config: MlpConfig,
    model: Option<Box<dyn ModelRuntime>>,
    device: Device,
    surface: Vec<Event>,
    offsets: Vec<(i32, i32)>,
    buffer: Vec<Event>,
}

impl MultiLayerPerceptronFilter {
    /// Constructs the filter with no backing model: a transparent
    /// pass-through that retains every event.
    pub fn passthrough(geometry: Geometry, config: MlpConfig) -> Self {
        let area = geometry.area();
        let mut filter = Self {
            geometry,
            config,
            model: None,
            device: Device::Cpu,
            surface: vec![Event::default(); area],
            offsets: neighborhood_offsets(),
            buffer: Vec::new(),
        };
        filter.initialize();
        filter
    }

    /// Loads a model via `loader` onto `device`, retrying once on CPU if the
    /// requested device fails, and fails construction only if both attempts
    /// fail.
    pub fn new(
        geometry: Geometry,
        config: MlpConfig,
        model_path: &Path,
        device: Device,
        loader: &dyn ModelLoader,
    ) -> Result<Self, MlpfError> {
        let (model, resolved_device) = match loader.load(model_path, &device) {
            Ok(model) => (model, device.clone()),
            Err(reason) if device != Device::Cpu => {
                log::warn!(
                    "mlpf: failed to load model at {} on {device}, retrying on cpu: {reason}",
                    model_path.display()
                );
                let model = loader.load(model_path, &Device::Cpu).map_err(|fallback_reason| {
                    ModelLoadError::FallbackFailed {
                        path: path_to_string(model_path),
                        device: device.to_string(),
                        reason: fallback_reason,
                    }
                })?;
                (model, Device::Cpu)
            }
            Err(reason) => {
                return Err(ModelLoadError::Load {
                    path: path_to_string(model_path),
                    device: device.to_string(),
                    reason,
                }
                .into())
            }
        };

        let area = geometry.area();
        let mut filter = Self {
            geometry,
            config,
            model: Some(model),
            device: resolved_device,
            surface: vec![Event::default(); area],
            offsets: neighborhood_offsets(),
            buffer: Vec::new(),
        };
        filter.initialize();
        Ok(filter)
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    fn build_features(&mut self, events: &[Event]) -> Vec<f32> {
        let mut features = vec![0f32; events.len() * PATCH_VOLUME];
        for (i, event) in events.iter().enumerate() {
            for (k, (dy, dx)) in self.offsets.iter().enumerate() {
                let nx = event.x as i32 + dx;
                let ny = event.y as i32 + dy;
                if nx < 0 || ny < 0 || !self.geometry.contains(nx as u16, ny as u16) {
                    continue;
                }
                let neighbor = self.surface[self.geometry.index(nx as u16, ny as u16)];
                if neighbor.t != 0 {
                    features[i * PATCH_VOLUME + k] =
                        (1.0 - (event.t - neighbor.t) as f64 / self.config.duration) as f32;
                }
                features[i * PATCH_VOLUME + k + PATCH_AREA] = 2.0 * event.polarity.as_u8() as f32 - 1.0;
            }
            let idx = self.geometry.index(event.x, event.y);
            self.surface[idx] = *event;
        }
        features
    }

    /// Classifies one full batch, returning a retain flag per input event in
    /// the same order. A classification fault retains the whole batch.
    fn classify_batch(&mut self, events: &[Event]) -> Vec<bool> {
        if events.is_empty() {
            return Vec::new();
        }
        let features = self.build_features(events);
        let model = self
            .model
            .as_ref()
            .expect("classify_batch is only called once a model is loaded");
        match model.forward(&features, events.len(), PATCH_VOLUME) {
            Ok(output) => (0..events.len())
                .map(|i| {
                    output
                        .get(i)
                        .and_then(|row| row.first())
                        .copied()
                        .unwrap_or(0.0) as f64
                        >= self.config.float_threshold
                })
                .collect(),
            Err(fault) => {
                log::warn!("mlpf: classification fault, retaining batch wholesale: {fault}");
                vec![true; events.len()]
            }
        }
    }

    /// Classifies whatever partial batch is currently buffered from prior
    /// [`Denoiser::evaluate`] calls, clearing the buffer.
    pub fn flush(&mut self) -> Vec<Event> {
        if self.model.is_none() || self.buffer.is_empty() {
            self.buffer.clear();
            return Vec::new();
        }
        let batch = std::mem::take(&mut self.buffer);
        let flags = self.classify_batch(&batch);
        batch
            .into_iter()
            .zip(flags)
            .filter_map(|(event, keep)| keep.then_some(event))
            .collect()
    }
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl Denoiser for MultiLayerPerceptronFilter {
    fn initialize(&mut self) {
        self.surface.iter_mut().for_each(|slot| *slot = Event::default());
        self.buffer.clear();
    }

    /// Buffers `event` until a full batch accumulates, then classifies the
    /// whole batch and reports the decision for `event` specifically.
    ///
    /// Events filling a not-yet-complete batch are provisionally retained;
    /// this is a pragmatic streaming accommodation, not a correctness
    /// property, and such provisional decisions can diverge from
    /// [`Denoiser::process_events`]'s from-scratch chunked classification of
    /// the same stream. Call [`MultiLayerPerceptronFilter::flush`] to
    /// resolve a trailing partial batch.
    fn evaluate(&mut self, event: Event) -> bool {
        if self.model.is_none() {
            return true;
        }
        self.buffer.push(event);
        if self.buffer.len() >= self.config.batch_size {
            let batch = std::mem::take(&mut self.buffer);
            let flags = self.classify_batch(&batch);
            *flags.last().expect("batch is non-empty")
        } else {
            true
        }
    }

    /// Classifies `events` in fixed-size chunks of `batch_size`, each chunk
    /// independently against the time surface as it stood when that chunk
    /// was reached. Ignores any events buffered by prior `evaluate` calls;
    /// call [`MultiLayerPerceptronFilter::flush`] first if those matter.
    fn process_events(&mut self, events: &[Event]) -> Vec<Event> {
        if self.model.is_none() {
            return events.to_vec();
        }
        let mut retained = Vec::new();
        for chunk in events.chunks(self.config.batch_size.max(1)) {
            let flags = self.classify_batch(chunk);
            for (event, keep) in chunk.iter().zip(flags) {
                if keep {
                    retained.push(*event);
                }
            }
        }
        retained
    }
}
