//! Persisted scan record
//!
//! The storage layer owns the lifecycle of these records; this module only
//! defines the shape the pipeline output is converted into.

use serde::{Deserialize, Serialize};

use super::stats::Ivs;
use crate::analysis::validation::ValidationErrors;
use crate::analysis::OcrResult;
use crate::vision::level_meter::Confidence;

/// Review state of a stored scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Complete,
    NeedsReview,
}

impl ScanStatus {
    pub fn from_errors(errors: &ValidationErrors) -> Self {
        if errors.is_empty() {
            ScanStatus::Complete
        } else {
            ScanStatus::NeedsReview
        }
    }
}

/// Raw output of each recognition method, kept for later review
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrSnapshot {
    /// Text returned by the OCR engine
    pub raw_text: Option<String>,
    pub vision_level: Option<f64>,
    pub vision_confidence: Option<Confidence>,
    pub formula_level: Option<f64>,
    pub native_level: Option<f64>,
}

/// The `ocr` sub-record of a stored scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRecord {
    #[serde(flatten)]
    pub snapshot: OcrSnapshot,
    pub status: ScanStatus,
}

/// A scanned creature as handed to storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedPokemon {
    pub id: String,
    pub name: Option<String>,
    pub cp: Option<u32>,
    pub hp: Option<u32>,
    pub level: Option<f64>,
    pub iv: Option<Ivs>,
    /// IV percentage, present whenever `iv` is
    pub iv_percent: Option<u32>,
    /// Reference to the stored screenshot
    pub image: String,
    /// Scan time in milliseconds since the Unix epoch
    pub scanned_at: u64,
    pub ocr: OcrRecord,
}

impl ScannedPokemon {
    /// Build the stored record for a finished scan
    pub fn from_scan(
        id: impl Into<String>,
        result: &OcrResult,
        errors: &ValidationErrors,
        image: impl Into<String>,
        scanned_at: u64,
        snapshot: OcrSnapshot,
    ) -> Self {
        Self {
            id: id.into(),
            name: result.name.clone(),
            cp: result.cp,
            hp: result.hp,
            level: result.level,
            iv: result.iv,
            iv_percent: result.iv.map(|iv| iv.percent()),
            image: image.into(),
            scanned_at,
            ocr: OcrRecord {
                snapshot,
                status: ScanStatus::from_errors(errors),
            },
        }
    }

    pub fn needs_review(&self) -> bool {
        self.ocr.status == ScanStatus::NeedsReview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::validation::validate_result;
    use crate::analysis::LevelMethod;
    use crate::config::TextLimits;

    fn sample_result() -> OcrResult {
        OcrResult {
            name: Some("pikachu".to_string()),
            cp: Some(536),
            hp: Some(80),
            iv: Ivs::new(15, 15, 15),
            level: Some(20.0),
            level_method: Some(LevelMethod::Formula),
        }
    }

    #[test]
    fn test_complete_record() {
        let result = sample_result();
        let errors = validate_result(&result, &TextLimits::default());
        let record = ScannedPokemon::from_scan(
            "scan-1",
            &result,
            &errors,
            "file:///shots/1.png",
            1_700_000_000_000,
            OcrSnapshot::default(),
        );

        assert_eq!(record.ocr.status, ScanStatus::Complete);
        assert_eq!(record.iv_percent, Some(100));
        assert!(!record.needs_review());
    }

    #[test]
    fn test_invalid_record_needs_review() {
        let result = OcrResult {
            cp: None,
            ..sample_result()
        };
        let errors = validate_result(&result, &TextLimits::default());
        let record =
            ScannedPokemon::from_scan("scan-2", &result, &errors, "img", 0, OcrSnapshot::default());

        assert!(record.needs_review());
    }

    #[test]
    fn test_record_json_shape() {
        let result = sample_result();
        let errors = validate_result(&result, &TextLimits::default());
        let record = ScannedPokemon::from_scan(
            "scan-3",
            &result,
            &errors,
            "img",
            42,
            OcrSnapshot {
                formula_level: Some(20.0),
                ..Default::default()
            },
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["scannedAt"], 42);
        assert_eq!(json["ocr"]["status"], "complete");
        assert_eq!(json["ocr"]["formulaLevel"], 20.0);
        assert_eq!(json["iv"]["atk"], 15);
    }
}
