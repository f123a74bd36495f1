//! Configuration module
//!
//! Handles detector thresholds and text-field limits.

pub mod settings;

pub use settings::{
    ArcSettings, BlobFilter, SearchBand, SegmentSettings, Settings, TextLimits, WhiteThreshold,
};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),
}
