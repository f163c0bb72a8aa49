use crate::{
    config::ModelConfig,
    model_service::{ModelError, ModelService},
    verdict::Architecture,
};
use ndarray::{Array, Ix4};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::{path::Path, sync::Mutex};

/// Sets up the process-wide ONNX Runtime environment. Call once before
/// creating any `OrtModelService`.
pub fn init_runtime() -> Result<(), ort::Error> {
    ort::init().with_name("glasses_prediction").commit()?;
    Ok(())
}

pub struct OrtModelService {
    architecture: Architecture,
    session: Mutex<Session>,
}

impl OrtModelService {
    pub fn new(
        architecture: Architecture,
        model_path: &Path,
        model_config: &ModelConfig,
    ) -> Result<Self, ort::Error> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(model_config.intra_threads)?
            .commit_from_file(model_path)?;

        tracing::info!(
            "Loaded {} ONNX session from {}",
            architecture,
            model_path.display()
        );

        Ok(Self {
            architecture,
            session: Mutex::new(session),
        })
    }

    pub fn vgg19(model_config: &ModelConfig) -> Result<Self, ort::Error> {
        Self::new(Architecture::Vgg19, &model_config.vgg19_path(), model_config)
    }

    pub fn vgg16(model_config: &ModelConfig) -> Result<Self, ort::Error> {
        Self::new(Architecture::Vgg16, &model_config.vgg16_path(), model_config)
    }
}

impl ModelService for OrtModelService {
    fn predict(&self, input: &Array<f32, Ix4>) -> Result<f32, ModelError> {
        let mut session = self
            .session
            .lock()
            .map_err(|e| ModelError::Poisoned(e.to_string()))?;

        let owned_buffer;
        let input_view = if input.view().is_standard_layout() {
            input.view()
        } else {
            owned_buffer = input.as_standard_layout().into_owned();
            owned_buffer.view()
        };

        let tensor_ref = TensorRef::from_array_view(input_view)?;
        let outputs = session.run(ort::inputs![tensor_ref])?;

        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        tracing::debug!("{} output shape {:?}", self.architecture, shape);

        data.first().copied().ok_or(ModelError::EmptyOutput)
    }
}
