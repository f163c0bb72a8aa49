use crate::{
    model_service::{ModelError, ModelService},
    preprocess::image_to_tensor,
    verdict::{Architecture, Detection, Verdict},
};
use image::DynamicImage;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("{architecture} inference failed: {source}")]
    Model {
        architecture: Architecture,
        #[source]
        source: ModelError,
    },
    #[error("Background prediction task failed: {0}")]
    Background(#[from] tokio::task::JoinError),
}

/// Runs the VGG19 and VGG16 glasses classifiers, in that order, on one image.
pub struct GlassesDetector {
    vgg19: Box<dyn ModelService>,
    vgg16: Box<dyn ModelService>,
}

impl GlassesDetector {
    pub fn new(vgg19: impl ModelService, vgg16: impl ModelService) -> Self {
        Self {
            vgg19: Box::new(vgg19),
            vgg16: Box::new(vgg16),
        }
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &DynamicImage) -> Result<Detection, DetectionError> {
        let input = image_to_tensor(image);

        let vgg19 = run_model(Architecture::Vgg19, self.vgg19.as_ref(), &input)?;
        let vgg16 = run_model(Architecture::Vgg16, self.vgg16.as_ref(), &input)?;

        Ok(Detection { vgg19, vgg16 })
    }

    /// Runs `detect` on the blocking pool so the calling task stays
    /// responsive, then hands the result back.
    pub async fn detect_in_background(
        self: Arc<Self>,
        image: Arc<DynamicImage>,
    ) -> Result<Detection, DetectionError> {
        tokio::task::spawn_blocking(move || self.detect(&image)).await?
    }
}

fn run_model(
    architecture: Architecture,
    model: &dyn ModelService,
    input: &ndarray::Array4<f32>,
) -> Result<Verdict, DetectionError> {
    let probability = model
        .predict(input)
        .map_err(|source| DetectionError::Model {
            architecture,
            source,
        })?;

    tracing::debug!("{} glasses probability={:.4}", architecture, probability);

    Ok(Verdict::new(architecture, probability))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::Locale;
    use image::{ImageBuffer, Rgb};
    use ndarray::{Array, Ix4};
    use std::sync::Mutex;

    #[derive(Clone)]
    struct MockModelService {
        name: &'static str,
        probability: f32,
        calls: Arc<Mutex<Vec<(&'static str, Vec<usize>, f32)>>>,
    }

    impl ModelService for MockModelService {
        fn predict(&self, input: &Array<f32, Ix4>) -> Result<f32, ModelError> {
            self.calls.lock().unwrap().push((
                self.name,
                input.shape().to_vec(),
                input.sum(),
            ));
            Ok(self.probability)
        }
    }

    struct FailingModelService;

    impl ModelService for FailingModelService {
        fn predict(&self, _input: &Array<f32, Ix4>) -> Result<f32, ModelError> {
            Err(ModelError::EmptyOutput)
        }
    }

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(64, 48, Rgb([10, 200, 30])))
    }

    fn mock_pair(
        vgg19: f32,
        vgg16: f32,
    ) -> (
        MockModelService,
        MockModelService,
        Arc<Mutex<Vec<(&'static str, Vec<usize>, f32)>>>,
    ) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            MockModelService {
                name: "vgg19",
                probability: vgg19,
                calls: calls.clone(),
            },
            MockModelService {
                name: "vgg16",
                probability: vgg16,
                calls: calls.clone(),
            },
            calls,
        )
    }

    #[test]
    fn test_detect_runs_vgg19_then_vgg16_on_same_tensor() {
        let (vgg19, vgg16, calls) = mock_pair(0.9, 0.3);
        let detector = GlassesDetector::new(vgg19, vgg16);

        let detection = detector.detect(&test_image()).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "vgg19");
        assert_eq!(calls[1].0, "vgg16");
        assert_eq!(calls[0].1, vec![1, 224, 224, 3]);
        assert_eq!(calls[0].2, calls[1].2);

        assert_eq!(detection.vgg19, Verdict::new(Architecture::Vgg19, 0.9));
        assert_eq!(detection.vgg16, Verdict::new(Architecture::Vgg16, 0.3));
    }

    #[test]
    fn test_model_failure_names_architecture() {
        let (vgg19, _, calls) = mock_pair(0.9, 0.3);
        let detector = GlassesDetector::new(vgg19, FailingModelService);

        let err = detector.detect(&test_image()).unwrap_err();

        assert!(matches!(
            err,
            DetectionError::Model {
                architecture: Architecture::Vgg16,
                ..
            }
        ));
        assert!(err.to_string().starts_with("VGG16 inference failed"));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_vgg19_failure_skips_vgg16() {
        let (_, vgg16, calls) = mock_pair(0.9, 0.3);
        let detector = GlassesDetector::new(FailingModelService, vgg16);

        let err = detector.detect(&test_image()).unwrap_err();

        assert!(err.to_string().starts_with("VGG19 inference failed"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detect_in_background() -> Result<(), Box<dyn std::error::Error>> {
        let (vgg19, vgg16, _) = mock_pair(0.42, 0.77);
        let detector = Arc::new(GlassesDetector::new(vgg19, vgg16));

        let detection = detector
            .detect_in_background(Arc::new(test_image()))
            .await?;

        assert_eq!(
            detection.render(Locale::English),
            "VGG19: No glasses (probability: 58.00%)\nVGG16: Glasses detected (probability: 77.00%)"
        );

        Ok(())
    }
}
