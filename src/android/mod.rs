//! Android JNI bridge module
//!
//! Provides JNI bindings for communication between the Rust core
//! and the app's screen layer.

pub mod bridge;

pub use bridge::*;
