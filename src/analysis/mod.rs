//! Result composition and validation
//!
//! Holds the pipeline's output type, the inputs callers hand in alongside a
//! screenshot, the level arbitration step and the pre-storage validation.

pub mod arbiter;
pub mod validation;

use serde::{Deserialize, Serialize};

use crate::game::stats::{BaseStats, Ivs};
use crate::vision::capture::ScanlineSampler;
use crate::vision::ocr::OcrEngine;

pub use arbiter::{arbitrate_level, Arbiter, LevelSource};
pub use validation::{validate_result, Field, ValidationErrors};

/// Which method produced the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelMethod {
    Vision,
    Formula,
    Native,
}

/// One screenshot's worth of recognized data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResult {
    pub name: Option<String>,
    pub cp: Option<u32>,
    pub hp: Option<u32>,
    pub iv: Option<Ivs>,
    pub level: Option<f64>,
    pub level_method: Option<LevelMethod>,
}

impl OcrResult {
    /// IV percentage when IVs are known
    pub fn iv_percent(&self) -> Option<u32> {
        self.iv.map(|iv| iv.percent())
    }
}

/// Stats the caller already knows for the species on screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KnownStats {
    pub base: BaseStats,
    /// IVs from an earlier appraisal, needed for the CP formula
    #[serde(default)]
    pub ivs: Option<Ivs>,
}

/// Reading supplied by the platform's own recognizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeReading {
    #[serde(default)]
    pub level: Option<f64>,
    #[serde(default)]
    pub iv: Option<Ivs>,
}

/// External services one analysis run calls into
pub struct Collaborators<'a> {
    pub ocr: &'a dyn OcrEngine,
    pub sampler: &'a dyn ScanlineSampler,
    pub native: Option<&'a NativeReading>,
}
