//! Appraise CLI - desktop testing entry point
//!
//! Runs the pipeline over a saved screenshot without requiring a device.
//! OCR text is read from a transcript file since no OCR engine ships with
//! the desktop build.
//!
//! Usage: `appraise <screenshot> [ocr-text-file] [species-names-file]`
//!
//! The species file holds one name per line.

use std::env;
use std::fs;
use std::process::ExitCode;

use poke_appraisal::config::Settings;
use poke_appraisal::vision::{KnownSpecies, PrerecognizedText};
use poke_appraisal::Appraiser;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(screenshot) = args.first() else {
        eprintln!("Usage: appraise <screenshot> [ocr-text-file] [species-names-file]");
        return ExitCode::FAILURE;
    };

    let image = match image::open(screenshot) {
        Ok(image) => image.to_rgba8(),
        Err(e) => {
            eprintln!("Failed to open {}: {}", screenshot, e);
            return ExitCode::FAILURE;
        }
    };

    let text = match args.get(1).map(fs::read_to_string).transpose() {
        Ok(text) => text.unwrap_or_default(),
        Err(e) => {
            eprintln!("Failed to read OCR text: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let species = match args.get(2).map(fs::read_to_string).transpose() {
        Ok(Some(contents)) => KnownSpecies::new(contents.lines()),
        Ok(None) => KnownSpecies::default(),
        Err(e) => {
            eprintln!("Failed to read species names: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Poke Appraisal");
    println!("==============");
    println!("Screenshot: {} ({}x{})", screenshot, image.width(), image.height());
    println!("Known species: {}", species.len());
    println!();

    let appraiser = Appraiser::new(Settings::default(), species);
    let ocr = PrerecognizedText::new(text);
    let report = appraiser.analyze_frame(&image, &ocr, None, None);
    let errors = appraiser.validate(&report.result);

    match serde_json::to_string_pretty(&report.result) {
        Ok(json) => println!("Result:\n{}", json),
        Err(e) => eprintln!("Failed to encode result: {}", e),
    }
    println!();
    println!("Method outputs:");
    println!(
        "  - Vision level: {:?} ({:?})",
        report.snapshot.vision_level, report.snapshot.vision_confidence
    );
    println!("  - Formula level: {:?}", report.snapshot.formula_level);
    println!();

    if errors.is_empty() {
        println!("Validation: complete");
    } else {
        println!("Validation: needs review");
        for (field, message) in &errors {
            println!("  - {:?}: {}", field, message);
        }
    }

    ExitCode::SUCCESS
}
