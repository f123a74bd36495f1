//! Poke Appraisal - stat inference from appraisal screenshots
//!
//! Given a screenshot of a captured creature's appraisal screen, this library
//! recovers its name, CP, HP, IVs and level. Text fields come from OCR, the
//! level from the position of the meter indicator on the screen or, failing
//! that, by inverting the CP formula against known base stats.
//!
//! ## Collaborators
//!
//! OCR, pixel sampling and species-name lookup are platform services passed
//! in through the traits in [`vision`]. Their failures never surface as
//! errors: the affected method simply contributes nothing to the result.

pub mod analysis;
pub mod android;
pub mod config;
pub mod game;
pub mod vision;

use image::RgbaImage;

use crate::analysis::{
    Arbiter, Collaborators, KnownStats, NativeReading, OcrResult, ValidationErrors,
};
use crate::config::{Settings, TextLimits};
use crate::game::cpm::CpmTable;
use crate::game::pokemon::OcrSnapshot;
use crate::game::stats::{BaseStats, Ivs};
use crate::vision::capture::FrameSampler;
use crate::vision::level_meter::VisionLevelCalculator;
use crate::vision::ocr::{OcrEngine, SpeciesNames, TextExtractor};

/// Result of one analysis run plus each method's raw output
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub result: OcrResult,
    pub snapshot: OcrSnapshot,
}

/// Read-only analysis context, shareable across threads
pub struct Appraiser {
    settings: Settings,
    cpm: CpmTable,
    species: Box<dyn SpeciesNames + Send + Sync>,
}

impl Appraiser {
    /// Create an appraiser with the given settings and species-name source
    pub fn new(settings: Settings, species: impl SpeciesNames + Send + Sync + 'static) -> Self {
        Self {
            settings,
            cpm: CpmTable::standard(),
            species: Box::new(species),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Analyze a screenshot and compose the result
    pub fn analyze_screenshot(
        &self,
        image: &RgbaImage,
        collaborators: &Collaborators<'_>,
        known: Option<&KnownStats>,
    ) -> OcrResult {
        self.analyze_detailed(image, collaborators, known).result
    }

    /// Analyze a screenshot using the frame itself for pixel sampling
    pub fn analyze_frame(
        &self,
        image: &RgbaImage,
        ocr: &dyn OcrEngine,
        native: Option<&NativeReading>,
        known: Option<&KnownStats>,
    ) -> ScanReport {
        let sampler = FrameSampler::new(image);
        let collaborators = Collaborators {
            ocr,
            sampler: &sampler,
            native,
        };
        self.analyze_detailed(image, &collaborators, known)
    }

    /// Analyze a screenshot, keeping every method's output for review
    pub fn analyze_detailed(
        &self,
        image: &RgbaImage,
        collaborators: &Collaborators<'_>,
        known: Option<&KnownStats>,
    ) -> ScanReport {
        let text = TextExtractor::new(&self.settings.text).extract(
            image,
            collaborators.ocr,
            self.species.as_ref(),
        );

        let vision = VisionLevelCalculator::new(&self.settings).calculate(collaborators.sampler);

        let native = collaborators.native.map(|reading| self.sanitize_native(reading));
        let ivs = native
            .and_then(|reading| reading.iv)
            .or_else(|| known.and_then(|k| k.ivs));

        let formula = match (text.cp, known, ivs) {
            (Some(cp), Some(known), Some(ivs)) => self.compute_level(cp, &known.base, &ivs),
            _ => None,
        };

        let result = Arbiter::compose(
            &text,
            &vision,
            formula,
            native.as_ref(),
            known.and_then(|k| k.ivs),
        );

        let snapshot = OcrSnapshot {
            raw_text: text.raw_text,
            vision_level: vision.level,
            vision_confidence: Some(vision.confidence),
            formula_level: formula,
            native_level: native.and_then(|reading| reading.level),
        };

        ScanReport { result, snapshot }
    }

    /// Best-fit level for an observed CP
    pub fn compute_level(&self, observed_cp: u32, base: &BaseStats, ivs: &Ivs) -> Option<f64> {
        game::level::compute_level(observed_cp, base, ivs, &self.cpm)
    }

    /// Check a result before it is stored
    pub fn validate(&self, result: &OcrResult) -> ValidationErrors {
        analysis::validate_result(result, &self.settings.text)
    }

    /// Drop native values that cannot be real
    fn sanitize_native(&self, reading: &NativeReading) -> NativeReading {
        let level = reading.level.filter(|&level| {
            let known = self.cpm.contains(level);
            if !known {
                log::warn!("Ignoring native level {} outside the level table", level);
            }
            known
        });
        let iv = reading.iv.filter(|iv| iv.is_valid());
        NativeReading { level, iv }
    }
}

/// Best-fit level for an observed CP using the standard multiplier table
pub fn compute_level(observed_cp: u32, base: &BaseStats, ivs: &Ivs) -> Option<f64> {
    game::level::compute_level(observed_cp, base, ivs, &CpmTable::standard())
}

/// Validate a result with the default field limits
pub fn validate_result(result: &OcrResult) -> ValidationErrors {
    analysis::validate_result(result, &TextLimits::default())
}
