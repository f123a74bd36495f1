//! Tunable thresholds for the appraisal pipeline
//!
//! Every number the detectors compare against lives here so it can be
//! retuned per device family without touching the algorithms.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Main settings structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Near-white pixel predicate
    pub white: WhiteThreshold,
    /// Vertical band searched for the level meter
    pub band: SearchBand,
    /// Run detection and clustering
    pub segments: SegmentSettings,
    /// Indicator blob selection
    pub blob_filter: BlobFilter,
    /// Arc bounds estimation
    pub arc: ArcSettings,
    /// Accepted ranges for text fields
    pub text: TextLimits,
}

impl Settings {
    /// Parse settings from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Settings for screenshots that went through lossy compression,
    /// where white UI elements come back slightly grey and tinted
    pub fn compressed_preset() -> Self {
        Self {
            white: WhiteThreshold {
                min_luminance: 195.0,
                max_chroma: 35,
            },
            segments: SegmentSettings {
                overlap_tolerance: 4,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Thresholds for the "near-white, low saturation" pixel test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteThreshold {
    /// Luminance (0.299R + 0.587G + 0.114B) must be strictly above this
    pub min_luminance: f64,
    /// max(R,G,B) - min(R,G,B) must be strictly below this
    pub max_chroma: u8,
}

impl Default for WhiteThreshold {
    fn default() -> Self {
        Self {
            min_luminance: 210.0,
            max_chroma: 25,
        }
    }
}

/// Band of rows, as fractions of image height, that holds the level meter.
///
/// The default skips the device status bar at the top and stops above the
/// creature artwork.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBand {
    pub top: f64,
    pub bottom: f64,
    /// Distance in pixels between sampled rows
    pub row_step: u32,
}

impl Default for SearchBand {
    fn default() -> Self {
        Self {
            top: 0.10,
            bottom: 0.45,
            row_step: 5,
        }
    }
}

impl SearchBand {
    /// Pixel rows `[top, bottom)` of the band for an image of `height` rows
    pub fn rows(&self, height: u32) -> (u32, u32) {
        let top = (self.top.clamp(0.0, 1.0) * height as f64).floor() as u32;
        let bottom = (self.bottom.clamp(0.0, 1.0) * height as f64).floor() as u32;
        (top.min(height), bottom.min(height))
    }
}

/// Segment and clustering parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentSettings {
    /// Runs narrower than this are noise
    pub min_run_width: u32,
    /// Max row distance between linked segments, in multiples of the row step
    pub row_gap_factor: f64,
    /// Horizontal slack when testing x-range overlap
    pub overlap_tolerance: u32,
}

impl Default for SegmentSettings {
    fn default() -> Self {
        Self {
            min_run_width: 3,
            row_gap_factor: 1.5,
            overlap_tolerance: 2,
        }
    }
}

/// Shape filter and scoring weights for the meter indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobFilter {
    /// Minimum width and height in pixels
    pub min_size: u32,
    /// Maximum width and height in pixels
    pub max_size: u32,
    pub min_aspect: f64,
    pub max_aspect: f64,
    /// Blobs closer than this fraction of image width to either edge are UI chrome
    pub edge_margin: f64,
    pub brightness_weight: f64,
    pub aspect_weight: f64,
}

impl Default for BlobFilter {
    fn default() -> Self {
        Self {
            min_size: 10,
            max_size: 45,
            min_aspect: 0.6,
            max_aspect: 1.6,
            edge_margin: 0.05,
            brightness_weight: 200.0,
            aspect_weight: 500.0,
        }
    }
}

/// Arc bounds estimation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcSettings {
    /// Distance in pixels between scanned rows
    pub row_step: u32,
    /// Width of the symmetric fallback arc, as a fraction of image width
    pub fallback_width_ratio: f64,
    /// Stop scanning once a row is narrower than this fraction of the widest row
    pub shrink_stop_ratio: f64,
    /// The widest row must exceed this fraction of image width to count as found
    pub min_width_ratio: f64,
    /// Measure edges from pixel content instead of using the symmetric guess per row
    pub measure_edges: bool,
}

impl Default for ArcSettings {
    fn default() -> Self {
        Self {
            row_step: 10,
            fallback_width_ratio: 0.85,
            shrink_stop_ratio: 0.9,
            min_width_ratio: 0.5,
            measure_edges: true,
        }
    }
}

/// Accepted ranges for OCR fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLimits {
    pub max_cp: u32,
    pub max_hp: u32,
    pub min_name_len: usize,
    pub max_name_len: usize,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            max_cp: 9999,
            max_hp: 999,
            min_name_len: 3,
            max_name_len: 50,
        }
    }
}
