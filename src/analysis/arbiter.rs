//! Level method arbitration
//!
//! Each recognition method may or may not produce a level. The arbiter
//! walks a fixed precedence list and keeps the first one available:
//! platform-native reading, then a high-confidence vision reading, then the
//! CP formula.

use super::{LevelMethod, NativeReading, OcrResult};
use crate::game::stats::Ivs;
use crate::vision::level_meter::VisionLevel;
use crate::vision::ocr::TextFields;

/// Vision and formula readings further apart than this are logged
const DISAGREEMENT_LEVELS: f64 = 5.0;

/// A level together with the method that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelSource {
    Native(f64),
    Vision(f64),
    Formula(f64),
}

impl LevelSource {
    pub fn level(&self) -> f64 {
        match *self {
            LevelSource::Native(level)
            | LevelSource::Vision(level)
            | LevelSource::Formula(level) => level,
        }
    }

    pub fn method(&self) -> LevelMethod {
        match self {
            LevelSource::Native(_) => LevelMethod::Native,
            LevelSource::Vision(_) => LevelMethod::Vision,
            LevelSource::Formula(_) => LevelMethod::Formula,
        }
    }
}

/// Choose the level reading to trust
pub fn arbitrate_level(
    native: Option<f64>,
    vision: &VisionLevel,
    formula: Option<f64>,
) -> Option<LevelSource> {
    if let (true, Some(seen), Some(computed)) = (vision.is_high_confidence(), vision.level, formula)
    {
        if (seen - computed).abs() > DISAGREEMENT_LEVELS {
            log::warn!(
                "Vision level {} disagrees with formula level {}",
                seen,
                computed
            );
        }
    }

    let candidates = [
        native.map(LevelSource::Native),
        vision
            .level
            .filter(|_| vision.is_high_confidence())
            .map(LevelSource::Vision),
        formula.map(LevelSource::Formula),
    ];

    candidates.into_iter().flatten().next()
}

/// Combines method outputs into one result
pub struct Arbiter;

impl Arbiter {
    /// Compose the final result. Name, CP and HP always come from text;
    /// IVs come from the native reading when present, else the caller's hint.
    pub fn compose(
        text: &TextFields,
        vision: &VisionLevel,
        formula: Option<f64>,
        native: Option<&NativeReading>,
        iv_hint: Option<Ivs>,
    ) -> OcrResult {
        let chosen = arbitrate_level(native.and_then(|n| n.level), vision, formula);

        match chosen {
            Some(source) => log::info!("Level {} from {:?}", source.level(), source.method()),
            None => log::info!("No level method available"),
        }

        OcrResult {
            name: text.name.clone(),
            cp: text.cp,
            hp: text.hp,
            iv: native.and_then(|n| n.iv).or(iv_hint),
            level: chosen.map(|source| source.level()),
            level_method: chosen.map(|source| source.method()),
        }
    }
}
