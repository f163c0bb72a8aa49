use super::{select_image::decode_in_background, ApiError};
use crate::server::SharedState;
use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use image::DynamicImage;
use std::{sync::Arc, time::Instant};
use tracing::instrument;

/// Classifies the currently selected image.
#[instrument(skip(state))]
pub async fn predict(State(state): State<SharedState>) -> Result<Response, ApiError> {
    state.metrics.record_request("/predict");

    let image = state
        .session
        .lock()
        .require_image()
        .map_err(|_| ApiError::NoImageSelected(state.locale.no_image_notice()))?;

    run_detection(&state, image, "/predict").await
}

/// Classifies the request body without touching the selection.
#[instrument(skip(state, image_data), fields(bytes = image_data.len()))]
pub async fn predict_image(
    State(state): State<SharedState>,
    image_data: Bytes,
) -> Result<Response, ApiError> {
    state.metrics.record_request("/predict_image");

    let image = decode_in_background(image_data).await?;

    run_detection(&state, Arc::new(image), "/predict_image").await
}

async fn run_detection(
    state: &SharedState,
    image: Arc<DynamicImage>,
    route: &str,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let detection = state.detector.clone().detect_in_background(image).await?;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    state.metrics.record_prediction_duration(elapsed_ms, route);
    state.metrics.record_detection(&detection);
    tracing::debug!("Prediction took {} ms", elapsed_ms);

    Ok(detection.render(state.locale).into_response())
}
