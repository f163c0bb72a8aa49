mod ort_service;

pub mod app;
pub mod config;
pub mod detector;
pub mod model_service;
pub mod preprocess;
pub mod session;
pub mod verdict;

pub use app::{load_detector, start_app, Cli, LoadError};
pub use detector::{DetectionError, GlassesDetector};
pub use ort_service::OrtModelService;
pub use session::{PredictionSession, SessionError};
pub use verdict::{Architecture, Detection, Locale, Verdict};
