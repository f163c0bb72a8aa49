use ndarray::{Array, Ix4};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("ONNX Runtime error: {0}")]
    Runtime(#[from] ort::Error),
    #[error("Session mutex poisoned: {0}")]
    Poisoned(String),
    #[error("Model returned an empty output")]
    EmptyOutput,
}

/// One pretrained classifier. Takes a `(1, 224, 224, 3)` tensor and returns
/// the probability that the subject wears glasses.
pub trait ModelService: Send + Sync + 'static {
    fn predict(&self, input: &Array<f32, Ix4>) -> Result<f32, ModelError>;
}
