//! Level meter arc bounds
//!
//! Finds the horizontal sweep of the semicircular level meter. Rows are
//! scanned from the bottom of the search band upwards, where the arc is at
//! its widest, and the scan stops as soon as the rows start narrowing.

use serde::{Deserialize, Serialize};

use super::blob::find_segments;
use super::capture::ScanlineSampler;
use super::VisionError;
use crate::config::Settings;

/// Where a pair of bounds came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsSource {
    /// Read from pixel content
    Measured,
    /// Synthesized from a fixed fraction of the image width
    Heuristic,
}

/// Horizontal extent of the meter, in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcBounds {
    pub left: f64,
    pub right: f64,
    pub source: BoundsSource,
}

impl ArcBounds {
    /// Symmetric bounds covering `width_ratio` of the image, centred
    pub fn heuristic(image_width: u32, width_ratio: f64) -> Self {
        let span = image_width as f64 * width_ratio;
        let center = image_width as f64 / 2.0;
        Self {
            left: center - span / 2.0,
            right: center + span / 2.0,
            source: BoundsSource::Heuristic,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }
}

/// Row-by-row arc edge estimator
pub struct ArcEstimator<'a> {
    settings: &'a Settings,
}

impl<'a> ArcEstimator<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Estimate the bounds, or `None` when no row is wide enough to be the arc
    pub fn estimate(
        &self,
        sampler: &dyn ScanlineSampler,
    ) -> Result<Option<ArcBounds>, VisionError> {
        let (width, height) = sampler.dimensions();
        let (top, bottom) = self.settings.band.rows(height);
        let arc = &self.settings.arc;
        let step = arc.row_step.max(1) as usize;

        let mut best: Option<(f64, f64)> = None;
        for y in (top..bottom).rev().step_by(step) {
            let Some((left, right)) = self.row_edges(sampler, y)? else {
                continue;
            };
            let row_width = right - left;

            match best {
                None => best = Some((left, right)),
                Some((best_left, best_right)) => {
                    let best_width = best_right - best_left;
                    if row_width > best_width {
                        best = Some((left, right));
                    } else if row_width < best_width * arc.shrink_stop_ratio {
                        // Past the widest point of the arc
                        break;
                    }
                }
            }
        }

        let source = if arc.measure_edges {
            BoundsSource::Measured
        } else {
            BoundsSource::Heuristic
        };

        Ok(best
            .filter(|(left, right)| right - left > width as f64 * arc.min_width_ratio)
            .map(|(left, right)| ArcBounds {
                left,
                right,
                source,
            }))
    }

    /// Estimated bounds, falling back to the fixed-ratio heuristic when the
    /// arc cannot be measured. Only sampler failures are errors.
    pub fn bounds_or_fallback(
        &self,
        sampler: &dyn ScanlineSampler,
    ) -> Result<ArcBounds, VisionError> {
        let (width, _) = sampler.dimensions();
        match self.estimate(sampler)? {
            Some(bounds) => {
                log::debug!("Arc bounds measured at {:.1}..{:.1}", bounds.left, bounds.right);
                Ok(bounds)
            }
            None => {
                let bounds = ArcBounds::heuristic(width, self.settings.arc.fallback_width_ratio);
                log::debug!(
                    "Arc bounds not found, using fallback {:.1}..{:.1}",
                    bounds.left,
                    bounds.right
                );
                Ok(bounds)
            }
        }
    }

    /// Outermost white columns of one row
    fn row_edges(
        &self,
        sampler: &dyn ScanlineSampler,
        y: u32,
    ) -> Result<Option<(f64, f64)>, VisionError> {
        let (width, _) = sampler.dimensions();
        if !self.settings.arc.measure_edges {
            let guess = ArcBounds::heuristic(width, self.settings.arc.fallback_width_ratio);
            return Ok(Some((guess.left, guess.right)));
        }

        let row = sampler.full_row(y)?;
        let segments = find_segments(
            y,
            &row,
            &self.settings.white,
            self.settings.segments.min_run_width,
        );

        Ok(match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => Some((first.x_start as f64, last.x_end as f64)),
            _ => None,
        })
    }
}
