use image::{imageops::FilterType, DynamicImage};
use ndarray::{Array, Ix4};
use std::path::Path;
use thiserror::Error;

/// Side length of the square input expected by both classifiers.
pub const INPUT_SIZE: u32 = 224;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Empty image data")]
    Empty,
    #[error("Error reading image: {0}")]
    Read(#[from] std::io::Error),
    #[error("Error decoding image: {0}")]
    Decode(#[from] image::ImageError),
}

pub fn decode_image(image_data: &[u8]) -> Result<DynamicImage, PreprocessError> {
    if image_data.is_empty() {
        return Err(PreprocessError::Empty);
    }

    let image_reader =
        image::ImageReader::new(std::io::Cursor::new(image_data)).with_guessed_format()?;

    Ok(image_reader.decode()?)
}

pub fn open_image(path: &Path) -> Result<DynamicImage, PreprocessError> {
    let image_data = std::fs::read(path)?;
    decode_image(&image_data)
}

/// Resizes to `INPUT_SIZE`x`INPUT_SIZE` with bilinear filtering and scales
/// every RGB channel to `[0, 1]`. Layout is NHWC: `(1, 224, 224, 3)`.
pub fn image_to_tensor(image: &DynamicImage) -> Array<f32, Ix4> {
    let size = INPUT_SIZE as usize;
    let resized = image
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle)
        .to_rgb8();

    let mut input = Array::zeros((1, size, size, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let x = x as usize;
        let y = y as usize;
        let [r, g, b] = pixel.0;
        input[[0, y, x, 0]] = (r as f32) / 255.;
        input[[0, y, x, 1]] = (g as f32) / 255.;
        input[[0, y, x, 2]] = (b as f32) / 255.;
    }

    input
}
