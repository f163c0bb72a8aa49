use serde::Deserialize;
use std::fmt;

/// Probabilities strictly above this value count as "glasses detected".
pub const DETECTION_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    Vgg19,
    Vgg16,
}

impl Architecture {
    pub fn label(&self) -> &'static str {
        match self {
            Architecture::Vgg19 => "VGG19",
            Architecture::Vgg16 => "VGG16",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Language of the rendered result lines and notices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en", alias = "english")]
    English,
    #[serde(rename = "id", alias = "indonesian")]
    Indonesian,
}

impl Locale {
    fn detected(&self) -> &'static str {
        match self {
            Locale::English => "Glasses detected",
            Locale::Indonesian => "Kacamata terdeteksi",
        }
    }

    fn not_detected(&self) -> &'static str {
        match self {
            Locale::English => "No glasses",
            Locale::Indonesian => "Tidak ada kacamata",
        }
    }

    fn probability(&self) -> &'static str {
        match self {
            Locale::English => "probability",
            Locale::Indonesian => "probabilitas",
        }
    }

    /// Shown when a prediction is requested before any image was selected.
    pub fn no_image_notice(&self) -> &'static str {
        match self {
            Locale::English => "Please select an image first",
            Locale::Indonesian => "Silakan pilih gambar terlebih dahulu",
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "id" | "indonesian" => Ok(Self::Indonesian),
            other => Err(format!(
                "{} is not a supported locale. Use either `en` or `id`.",
                other
            )),
        }
    }
}

/// Output of a single model for a single image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub architecture: Architecture,
    pub probability: f32,
}

impl Verdict {
    pub fn new(architecture: Architecture, probability: f32) -> Self {
        Self {
            architecture,
            probability,
        }
    }

    pub fn glasses_detected(&self) -> bool {
        self.probability > DETECTION_THRESHOLD
    }

    /// Percentage backing the displayed verdict: `100 * p` for a detection,
    /// `100 * (1 - p)` otherwise.
    pub fn confidence_percent(&self) -> f32 {
        if self.glasses_detected() {
            self.probability * 100.0
        } else {
            (1.0 - self.probability) * 100.0
        }
    }

    pub fn render(&self, locale: Locale) -> String {
        let outcome = if self.glasses_detected() {
            locale.detected()
        } else {
            locale.not_detected()
        };

        format!(
            "{}: {} ({}: {:.2}%)",
            self.architecture,
            outcome,
            locale.probability(),
            round_half_up(self.confidence_percent())
        )
    }
}

/// Two-decimal rounding with ties away from zero. `{:.2}` alone breaks exact
/// ties to even. Widening to f64 keeps `value * 100` exact.
fn round_half_up(value: f32) -> f64 {
    (f64::from(value) * 100.0).round() / 100.0
}

/// Results of both classifiers for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub vgg19: Verdict,
    pub vgg16: Verdict,
}

impl Detection {
    /// VGG19 line first, then VGG16.
    pub fn render(&self, locale: Locale) -> String {
        format!("{}\n{}", self.vgg19.render(locale), self.vgg16.render(locale))
    }
}
