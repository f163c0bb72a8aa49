use super::ApiError;
use crate::server::SharedState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
};
use glasses_prediction::preprocess::decode_image;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct SelectedImage {
    pub width: u32,
    pub height: u32,
}

pub(crate) async fn decode_in_background(image_data: Bytes) -> Result<DynamicImage, ApiError> {
    let image = tokio::task::spawn_blocking(move || decode_image(&image_data)).await??;
    Ok(image)
}

#[instrument(skip(state, image_data), fields(bytes = image_data.len()))]
pub async fn select_image(
    State(state): State<SharedState>,
    image_data: Bytes,
) -> Result<Json<SelectedImage>, ApiError> {
    state.metrics.record_request("/image");

    let image = decode_in_background(image_data).await?;
    let selected = SelectedImage {
        width: image.width(),
        height: image.height(),
    };

    state.session.lock().select(image);
    tracing::info!("Selected image {}x{}", selected.width, selected.height);

    Ok(Json(selected))
}

#[instrument(skip(state))]
pub async fn clear_image(State(state): State<SharedState>) -> StatusCode {
    state.metrics.record_request("/image");
    state.session.lock().clear();

    StatusCode::NO_CONTENT
}
