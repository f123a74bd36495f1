//! Vision and text recognition module
//!
//! Handles screenshot pixel sampling, level-meter detection and OCR text
//! parsing for the appraisal screen.

pub mod arc;
pub mod blob;
pub mod capture;
pub mod level_meter;
pub mod ocr;

pub use arc::{ArcBounds, ArcEstimator, BoundsSource};
pub use blob::{Blob, BlobDetector, Segment};
pub use capture::{FrameSampler, ScanlineSampler};
pub use level_meter::{Confidence, VisionLevel, VisionLevelCalculator};
pub use ocr::{KnownSpecies, OcrEngine, PrerecognizedText, SpeciesNames, TextExtractor};

/// Vision system errors
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("Row {y} span {x_start}+{width} is outside the image")]
    RowOutOfBounds { y: u32, x_start: u32, width: u32 },
    #[error("Invalid frame data")]
    InvalidFrameData,
    #[error("Pixel sampler unavailable: {0}")]
    SamplerUnavailable(String),
}
