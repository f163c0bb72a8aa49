use crate::{
    config::{ModelConfig, Settings},
    detector::GlassesDetector,
    ort_service::{init_runtime, OrtModelService},
    preprocess::open_image,
    session::{PredictionSession, SessionError},
    verdict::Locale,
};
use clap::Parser;
use std::{path::PathBuf, process::ExitCode, sync::Arc};
use thiserror::Error;

/// Estimate whether the person in a photo wears glasses, using VGG19 and
/// VGG16 classifiers.
#[derive(Parser, Debug)]
#[command(name = "glasses_prediction", version)]
pub struct Cli {
    /// Image to classify.
    pub image: Option<PathBuf>,

    /// Language of the result lines (`en` or `id`). Overrides the configured locale.
    #[arg(long, value_parser = parse_locale)]
    pub locale: Option<Locale>,
}

fn parse_locale(s: &str) -> Result<Locale, String> {
    Locale::try_from(s.to_string())
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to load model: {0}")]
    Runtime(#[from] ort::Error),
}

/// Validates the model files and opens one ONNX session per architecture.
pub fn load_detector(model_config: &ModelConfig) -> Result<GlassesDetector, LoadError> {
    model_config.validate().map_err(LoadError::InvalidConfig)?;
    init_runtime()?;

    let vgg19 = OrtModelService::vgg19(model_config)?;
    let vgg16 = OrtModelService::vgg16(model_config)?;

    Ok(GlassesDetector::new(vgg19, vgg16))
}

pub async fn start_app(
    settings: Settings,
    cli: Cli,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let locale = cli.locale.unwrap_or(settings.locale);

    let mut session = PredictionSession::new();
    if let Some(path) = &cli.image {
        let image = open_image(path)?;
        tracing::info!(
            "Selected {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        session.select(image);
    }

    let image = match session.require_image() {
        Ok(image) => image,
        Err(SessionError::NoImageSelected) => {
            eprintln!("{}", locale.no_image_notice());
            return Ok(ExitCode::FAILURE);
        }
    };

    let detector = Arc::new(load_detector(&settings.models)?);
    let detection = detector.detect_in_background(image).await?;

    println!("{}", detection.render(locale));

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use image::{ImageBuffer, Rgb};

    fn settings(model_dir: PathBuf) -> Settings {
        Settings {
            log_level: LogLevel::Info,
            locale: Locale::English,
            models: ModelConfig {
                model_dir,
                vgg19_file: "vgg19.onnx".to_string(),
                vgg16_file: "vgg16.onnx".to_string(),
                intra_threads: 1,
            },
        }
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["glasses_prediction", "--locale", "id", "face.jpg"]);

        assert_eq!(cli.image, Some(PathBuf::from("face.jpg")));
        assert_eq!(cli.locale, Some(Locale::Indonesian));

        let cli = Cli::parse_from(["glasses_prediction"]);
        assert!(cli.image.is_none());
        assert!(cli.locale.is_none());

        assert!(Cli::try_parse_from(["glasses_prediction", "--locale", "fr"]).is_err());
    }

    #[tokio::test]
    async fn test_no_image_exits_without_loading_models() {
        let cli = Cli {
            image: None,
            locale: None,
        };

        let exit_code = start_app(settings(PathBuf::from("/nonexistent")), cli)
            .await
            .unwrap();

        assert_eq!(exit_code, ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn test_missing_models_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("face.png");
        ImageBuffer::from_pixel(8, 8, Rgb([1u8, 2, 3]))
            .save(&image_path)
            .unwrap();

        let cli = Cli {
            image: Some(image_path),
            locale: None,
        };

        let err = start_app(settings(dir.path().to_path_buf()), cli)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Model file not found"));
    }

    #[tokio::test]
    async fn test_undecodable_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("face.png");
        std::fs::write(&image_path, b"not a png").unwrap();

        let cli = Cli {
            image: Some(image_path),
            locale: None,
        };

        let err = start_app(settings(dir.path().to_path_buf()), cli)
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Error decoding image"));
    }
}
