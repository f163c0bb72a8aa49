mod health;
mod metrics;
mod predict;
mod select_image;

use crate::server::SharedState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use glasses_prediction::{preprocess::PreprocessError, DetectionError};
use thiserror::Error;

pub use health::healthcheck;
pub use metrics::metrics_handler;
pub use predict::{predict, predict_image};
pub use select_image::{clear_image, select_image};

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/metrics", get(metrics_handler))
        .route("/image", post(select_image).delete(clear_image))
        .route("/predict", post(predict))
        .route("/predict_image", post(predict_image))
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NoImageSelected(&'static str),
    #[error("Invalid image: {0}")]
    InvalidImage(#[from] PreprocessError),
    #[error("Prediction failed: {0}")]
    Prediction(#[from] DetectionError),
    #[error("Background task failed: {0}")]
    Background(#[from] tokio::task::JoinError),
    #[error("Metrics encoding failed: {0}")]
    Metrics(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NoImageSelected(_) | ApiError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            ApiError::Prediction(_) | ApiError::Background(_) | ApiError::Metrics(_) => {
                tracing::error!("{}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
