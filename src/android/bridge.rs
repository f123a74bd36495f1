//! JNI function exports for Android integration
//!
//! These functions are called from Kotlin via JNI. The app's screen layer
//! captures the screenshot and runs the platform OCR, then hands the frame,
//! the recognized text and any known stats to the Rust core.

use jni::objects::{JByteArray, JClass, JObject, JString};
use jni::sys::{jboolean, jdouble, jint, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::analysis::{KnownStats, NativeReading, OcrResult};
use crate::config::Settings;
use crate::game::stats::{BaseStats, Ivs};
use crate::vision::capture::frame_from_raw;
use crate::vision::ocr::{KnownSpecies, PrerecognizedText};
use crate::Appraiser;

/// Returned by `computeLevel` when no level fits
pub const NO_LEVEL: jdouble = -1.0;

/// Appraiser shared by every JNI call. Read-only once set.
static APPRAISER: OnceCell<Appraiser> = OnceCell::new();

/// Initialize the appraisal core
///
/// Called once when the app starts. Later calls keep the first instance.
#[no_mangle]
pub extern "system" fn Java_io_pokeappraisal_AppraisalCore_init<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    config_json: JString<'local>,
    species_json: JString<'local>,
) -> jboolean {
    // Initialize Android logger
    #[cfg(target_os = "android")]
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Debug)
            .with_tag("PokeAppraisal"),
    );

    log::info!("Initializing appraisal core");

    // Parse configuration
    let settings = match optional_string(&mut env, &config_json) {
        Some(config) => Settings::from_json(&config).unwrap_or_else(|e| {
            log::error!("{}, using defaults", e);
            Settings::default()
        }),
        None => Settings::default(),
    };

    let species = match optional_string(&mut env, &species_json) {
        Some(json) => match KnownSpecies::from_json(&json) {
            Ok(species) => species,
            Err(e) => {
                log::error!("Failed to parse species names: {}", e);
                return JNI_FALSE;
            }
        },
        None => KnownSpecies::default(),
    };
    log::info!("Loaded {} species names", species.len());

    if APPRAISER.set(Appraiser::new(settings, species)).is_err() {
        log::warn!("Appraisal core already initialized");
    }

    JNI_TRUE
}

/// Analyze a screenshot and return the result as JSON
///
/// `frame_data` is RGBA8. Returns null when the core is not initialized or
/// the frame is malformed.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub extern "system" fn Java_io_pokeappraisal_AppraisalCore_analyzeFrame<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    frame_data: JByteArray<'local>,
    width: jint,
    height: jint,
    ocr_text: JString<'local>,
    known_stats_json: JString<'local>,
    native_json: JString<'local>,
) -> JString<'local> {
    let Some(appraiser) = APPRAISER.get() else {
        log::error!("Appraisal core not initialized");
        return null_string();
    };

    // Get frame data from Java byte array
    let frame_bytes = match env.convert_byte_array(frame_data) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Failed to convert frame data: {}", e);
            return null_string();
        }
    };

    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        log::error!("Invalid frame size {}x{}", width, height);
        return null_string();
    };

    let frame = match frame_from_raw(&frame_bytes, width, height) {
        Ok(frame) => frame,
        Err(e) => {
            log::error!("Failed to build frame: {}", e);
            return null_string();
        }
    };

    let text = optional_string(&mut env, &ocr_text).unwrap_or_default();
    let known: Option<KnownStats> = parse_optional(&mut env, &known_stats_json, "known stats");
    let native: Option<NativeReading> = parse_optional(&mut env, &native_json, "native reading");

    let ocr = PrerecognizedText::new(text);
    let report = appraiser.analyze_frame(&frame, &ocr, native.as_ref(), known.as_ref());

    to_json_string(&mut env, &report.result)
}

/// Solve the level for a CP without an image
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub extern "system" fn Java_io_pokeappraisal_AppraisalCore_computeLevel<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    cp: jint,
    base_atk: jint,
    base_def: jint,
    base_sta: jint,
    iv_atk: jint,
    iv_def: jint,
    iv_sta: jint,
) -> jdouble {
    let stat = |value: jint| u32::try_from(value).ok();
    let iv = |value: jint| u8::try_from(value).ok();

    let (Some(cp), Some(atk), Some(def), Some(sta)) =
        (stat(cp), stat(base_atk), stat(base_def), stat(base_sta))
    else {
        return NO_LEVEL;
    };
    let Some(ivs) = iv(iv_atk)
        .zip(iv(iv_def))
        .zip(iv(iv_sta))
        .and_then(|((a, d), s)| Ivs::new(a, d, s))
    else {
        return NO_LEVEL;
    };

    let base = BaseStats::new(atk, def, sta);
    let level = match APPRAISER.get() {
        Some(appraiser) => appraiser.compute_level(cp, &base, &ivs),
        None => crate::compute_level(cp, &base, &ivs),
    };

    level.unwrap_or(NO_LEVEL)
}

/// Validate a result JSON and return the field errors as JSON
#[no_mangle]
pub extern "system" fn Java_io_pokeappraisal_AppraisalCore_validateResult<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    result_json: JString<'local>,
) -> JString<'local> {
    let result: OcrResult = parse_optional(&mut env, &result_json, "result").unwrap_or_default();

    let errors = match APPRAISER.get() {
        Some(appraiser) => appraiser.validate(&result),
        None => crate::validate_result(&result),
    };

    to_json_string(&mut env, &errors)
}

fn null_string<'local>() -> JString<'local> {
    JObject::null().into()
}

/// Read a Java string, treating null as absent
fn optional_string(env: &mut JNIEnv<'_>, value: &JString<'_>) -> Option<String> {
    if value.is_null() {
        return None;
    }

    match env.get_string(value) {
        Ok(java_str) => Some(java_str.into()),
        Err(e) => {
            log::error!("Failed to get string: {}", e);
            None
        }
    }
}

fn parse_optional<T: serde::de::DeserializeOwned>(
    env: &mut JNIEnv<'_>,
    value: &JString<'_>,
    what: &str,
) -> Option<T> {
    let json = optional_string(env, value)?;
    match serde_json::from_str(&json) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("Ignoring malformed {}: {}", what, e);
            None
        }
    }
}

fn to_json_string<'local>(env: &mut JNIEnv<'local>, value: &impl Serialize) -> JString<'local> {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
    match env.new_string(json) {
        Ok(string) => string,
        Err(e) => {
            log::error!("Failed to create result string: {}", e);
            null_string()
        }
    }
}
