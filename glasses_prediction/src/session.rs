use image::DynamicImage;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("No image selected")]
    NoImageSelected,
}

/// Holds the single image currently selected for prediction.
#[derive(Debug, Default)]
pub struct PredictionSession {
    image: Option<Arc<DynamicImage>>,
}

impl PredictionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previous selection.
    pub fn select(&mut self, image: DynamicImage) -> Arc<DynamicImage> {
        let image = Arc::new(image);
        self.image = Some(image.clone());
        image
    }

    pub fn clear(&mut self) {
        self.image = None;
    }

    pub fn selected(&self) -> Option<Arc<DynamicImage>> {
        self.image.clone()
    }

    pub fn require_image(&self) -> Result<Arc<DynamicImage>, SessionError> {
        self.selected().ok_or(SessionError::NoImageSelected)
    }
}
