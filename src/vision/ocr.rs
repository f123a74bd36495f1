//! Text extraction from the appraisal screen
//!
//! The OCR engine itself is a platform collaborator. This module parses the
//! text it returns into the creature's name, CP and HP.

use std::collections::HashSet;

use image::RgbaImage;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::TextLimits;

static CP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)CP\s*(\d+)").expect("CP pattern is valid"));
static HP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)HP\s*(\d+)(?:\s*/\s*\d+)?").expect("HP pattern is valid")
});
static HP_FRACTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*/\s*\d+").expect("HP fraction pattern is valid"));
static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*$").expect("name pattern is valid")
});
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Raw output of an OCR engine
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Engine-reported confidence, 0.0-1.0
    pub confidence: f32,
}

/// OCR engine collaborator
pub trait OcrEngine {
    fn recognize_text(&self, image: &RgbaImage) -> Result<RecognizedText, OCRError>;
}

/// Text the platform already recognized before handing the frame over
pub struct PrerecognizedText {
    text: String,
}

impl PrerecognizedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrEngine for PrerecognizedText {
    fn recognize_text(&self, _image: &RgbaImage) -> Result<RecognizedText, OCRError> {
        if self.text.trim().is_empty() {
            return Err(OCRError::NoTextFound);
        }
        Ok(RecognizedText {
            text: self.text.clone(),
            confidence: 1.0,
        })
    }
}

/// Species-name lookup collaborator
pub trait SpeciesNames {
    fn is_known_species_name(&self, name: &str) -> bool;
}

/// In-memory species-name set, matched case-insensitively
#[derive(Debug, Clone, Default)]
pub struct KnownSpecies {
    names: HashSet<String>,
}

impl KnownSpecies {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.as_ref().trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Load from a JSON array of names
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let names: Vec<String> = serde_json::from_str(json)?;
        Ok(Self::new(names))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl SpeciesNames for KnownSpecies {
    fn is_known_species_name(&self, name: &str) -> bool {
        self.names.contains(&name.trim().to_lowercase())
    }
}

/// Fields read from the screen text. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFields {
    /// Lowercase species name
    pub name: Option<String>,
    pub cp: Option<u32>,
    pub hp: Option<u32>,
    /// Engine output, kept for review
    pub raw_text: Option<String>,
}

/// Collapse whitespace runs into single spaces
fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn capture_number(pattern: &Regex, text: &str) -> Option<u32> {
    pattern.captures(text)?.get(1)?.as_str().parse().ok()
}

/// CP from text such as `"CP 1234"` or `"cp1234"`
pub fn parse_cp(text: &str, limits: &TextLimits) -> Option<u32> {
    let cp = capture_number(&CP_PATTERN, &normalize(text))?;
    (cp > 0 && cp <= limits.max_cp).then_some(cp)
}

/// HP from `"HP 80/80"`, `"HP 80"` or a bare `"80/80"`
pub fn parse_hp(text: &str, limits: &TextLimits) -> Option<u32> {
    let text = normalize(text);
    let hp = capture_number(&HP_PATTERN, &text)
        .or_else(|| capture_number(&HP_FRACTION_PATTERN, &text))?;
    (hp > 0 && hp <= limits.max_hp).then_some(hp)
}

/// First line that looks like a species name.
///
/// Lines with digits or the `CP`/`HP` labels are skipped, the first
/// capitalized-words line of acceptable length wins.
pub fn parse_name(text: &str, limits: &TextLimits) -> Option<String> {
    text.lines()
        .map(normalize)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.chars().any(|c| c.is_ascii_digit()))
        .filter(|line| !line.contains("CP") && !line.contains("HP"))
        .find(|line| {
            let len = line.chars().count();
            len >= limits.min_name_len && len <= limits.max_name_len && NAME_PATTERN.is_match(line)
        })
}

/// Runs OCR over a screenshot and parses the result
pub struct TextExtractor<'a> {
    limits: &'a TextLimits,
}

impl<'a> TextExtractor<'a> {
    pub fn new(limits: &'a TextLimits) -> Self {
        Self { limits }
    }

    /// Parse already-recognized text
    pub fn parse(&self, text: &str, names: &dyn SpeciesNames) -> TextFields {
        let name = parse_name(text, self.limits).and_then(|name| {
            if names.is_known_species_name(&name) {
                Some(name.to_lowercase())
            } else {
                log::debug!("Rejecting unknown species name {:?}", name);
                None
            }
        });

        TextFields {
            name,
            cp: parse_cp(text, self.limits),
            hp: parse_hp(text, self.limits),
            raw_text: Some(text.to_string()),
        }
    }

    /// Run OCR and parse. Engine failures give empty fields.
    pub fn extract(
        &self,
        image: &RgbaImage,
        engine: &dyn OcrEngine,
        names: &dyn SpeciesNames,
    ) -> TextFields {
        match engine.recognize_text(image) {
            Ok(recognized) => {
                log::debug!(
                    "OCR returned {} chars at confidence {:.2}",
                    recognized.text.len(),
                    recognized.confidence
                );
                self.parse(&recognized.text, names)
            }
            Err(e) => {
                log::warn!("OCR failed: {}", e);
                TextFields::default()
            }
        }
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OCRError {
    #[error("OCR engine failed: {0}")]
    EngineFailure(String),
    #[error("No text found")]
    NoTextFound,
}
