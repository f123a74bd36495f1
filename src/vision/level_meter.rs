//! Level reading from the appraisal meter
//!
//! The meter's position indicator is a small round white blob riding on the
//! arc. Its horizontal position between the arc ends maps linearly onto the
//! level range.

use serde::{Deserialize, Serialize};

use super::arc::{ArcBounds, ArcEstimator};
use super::blob::{Blob, BlobDetector};
use super::capture::ScanlineSampler;
use crate::config::{BlobFilter, Settings};

/// Level at the left end of the arc
pub const ARC_MIN_LEVEL: f64 = 1.0;
/// Levels spanned from the left end to the right end
pub const ARC_LEVEL_SPAN: f64 = 49.0;

/// How far a vision reading can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

/// Outcome of the vision method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisionLevel {
    pub level: Option<f64>,
    pub confidence: Confidence,
}

impl VisionLevel {
    /// No usable reading
    pub fn none() -> Self {
        Self {
            level: None,
            confidence: Confidence::Low,
        }
    }

    pub fn is_high_confidence(&self) -> bool {
        self.confidence == Confidence::High && self.level.is_some()
    }
}

/// Score used to rank indicator candidates
pub fn indicator_score(blob: &Blob, filter: &BlobFilter) -> f64 {
    let aspect_score = 1.0 - (1.0 - blob.aspect_ratio()).abs();
    blob.brightness() * filter.brightness_weight + aspect_score * filter.aspect_weight
}

fn is_candidate(blob: &Blob, image_width: u32, filter: &BlobFilter) -> bool {
    let size_range = filter.min_size..=filter.max_size;
    if !size_range.contains(&blob.width()) || !size_range.contains(&blob.height()) {
        return false;
    }

    let aspect = blob.aspect_ratio();
    if aspect < filter.min_aspect || aspect > filter.max_aspect {
        return false;
    }

    // UI chrome hugs the screen edges
    let margin = image_width as f64 * filter.edge_margin;
    blob.min_x as f64 >= margin && blob.max_x as f64 <= image_width as f64 - margin
}

/// Pick the blob most likely to be the meter indicator
pub fn select_indicator<'a>(
    blobs: &'a [Blob],
    image_width: u32,
    filter: &BlobFilter,
) -> Option<&'a Blob> {
    let mut best: Option<(&Blob, f64)> = None;
    for blob in blobs.iter().filter(|b| is_candidate(b, image_width, filter)) {
        let score = indicator_score(blob, filter);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((blob, score)),
        }
    }
    best.map(|(blob, _)| blob)
}

/// Map an x position between the arc ends onto the half-level lattice
pub fn level_from_position(center_x: f64, bounds: &ArcBounds) -> f64 {
    let span = bounds.width();
    let ratio = if span > 0.0 {
        ((center_x - bounds.left) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let raw_level = ARC_MIN_LEVEL + ratio * ARC_LEVEL_SPAN;
    (raw_level * 2.0).round() / 2.0
}

/// Runs blob detection and arc estimation and turns them into a level
pub struct VisionLevelCalculator<'a> {
    settings: &'a Settings,
}

impl<'a> VisionLevelCalculator<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Level from already-detected blobs and bounds
    pub fn level_for(&self, blobs: &[Blob], bounds: &ArcBounds, image_width: u32) -> VisionLevel {
        let Some(indicator) = select_indicator(blobs, image_width, &self.settings.blob_filter)
        else {
            log::debug!("No level indicator among {} blobs", blobs.len());
            return VisionLevel::none();
        };

        let level = level_from_position(indicator.center_x, bounds);
        log::debug!(
            "Level indicator at x={:.1} ({:?} bounds) reads level {}",
            indicator.center_x,
            bounds.source,
            level
        );

        VisionLevel {
            level: Some(level),
            confidence: Confidence::High,
        }
    }

    /// Full vision pass over a screenshot. Sampler failures end the pass
    /// with no reading.
    pub fn calculate(&self, sampler: &dyn ScanlineSampler) -> VisionLevel {
        let (width, _) = sampler.dimensions();

        let blobs = match BlobDetector::new(self.settings).detect(sampler) {
            Ok(blobs) => blobs,
            Err(e) => {
                log::warn!("Blob scan failed: {}", e);
                return VisionLevel::none();
            }
        };
        if blobs.is_empty() {
            return VisionLevel::none();
        }

        let bounds = match ArcEstimator::new(self.settings).bounds_or_fallback(sampler) {
            Ok(bounds) => bounds,
            Err(e) => {
                log::warn!("Arc scan failed: {}", e);
                return VisionLevel::none();
            }
        };

        self.level_for(&blobs, &bounds, width)
    }
}
