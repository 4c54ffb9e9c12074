//! Optional TensorFlow Lite backed [`ModelRuntime`].
//!
//! Disabled by default; enable the `tflite` feature to build it. Loads a
//! single-input, single-output `.tflite` artifact from disk and runs a
//! batched forward pass by writing the whole feature matrix into the
//! model's input tensor in one shot.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use tflite::ops::builtin::BuiltinOpResolver;
use tflite::{FlatBufferModel, Interpreter, InterpreterBuilder};

use super::{Device, ModelLoader, ModelRuntime};
use crate::error::ClassificationFault;

pub struct TfliteModelLoader;

impl ModelLoader for TfliteModelLoader {
    fn load(&self, path: &Path, device: &Device) -> Result<Box<dyn ModelRuntime>, String> {
        if !matches!(device, Device::Cpu) {
            return Err(format!("tflite backend only supports cpu, got {device}"));
        }
        let bytes = fs::read(path).map_err(|e| e.to_string())?;
        let model = FlatBufferModel::build_from_buffer(bytes).map_err(|e| e.to_string())?;
        let resolver = BuiltinOpResolver::default();
        let builder = InterpreterBuilder::new(model, resolver).map_err(|e| e.to_string())?;
        let interpreter = builder.build().map_err(|e| e.to_string())?;
        Ok(Box::new(TfliteRuntime { interpreter: RefCell::new(interpreter) }))
    }
}

struct TfliteRuntime {
    interpreter: RefCell<Interpreter<'static, BuiltinOpResolver>>,
}

impl ModelRuntime for TfliteRuntime {
    fn forward(&self, input: &[f32], rows: usize, cols: usize) -> Result<Vec<Vec<f32>>, ClassificationFault> {
        let mut interpreter = self.interpreter.borrow_mut();
        let input_idx = *interpreter
            .inputs()
            .first()
            .ok_or_else(|| ClassificationFault("model has no input tensor".into()))?;
        interpreter
            .resize_input_tensor(input_idx, &[rows as i32, cols as i32])
            .map_err(|e| ClassificationFault(e.to_string()))?;
        interpreter
            .allocate_tensors()
            .map_err(|e| ClassificationFault(e.to_string()))?;

        let slice = interpreter
            .tensor_data_mut::<f32>(input_idx)
            .map_err(|e| ClassificationFault(e.to_string()))?;
        let copy_len = input.len().min(slice.len());
        slice[..copy_len].copy_from_slice(&input[..copy_len]);

        interpreter
            .invoke()
            .map_err(|e| ClassificationFault(e.to_string()))?;

        let output_idx = *interpreter
            .outputs()
            .first()
            .ok_or_else(|| ClassificationFault("model has no output tensor".into()))?;
        let output = interpreter
            .tensor_data::<f32>(output_idx)
            .map_err(|e| ClassificationFault(e.to_string()))?;

        let cols_out = if rows == 0 { 0 } else { output.len() / rows };
        Ok(output.chunks(cols_out.max(1)).map(|row| row.to_vec()).collect())
    }
}
