//! Game data and formulas
//!
//! Base stats, IVs, the CP multiplier table, the CP-to-level inverter and the
//! persisted scan record.

pub mod cpm;
pub mod level;
pub mod pokemon;
pub mod stats;

pub use cpm::CpmTable;
pub use level::{compute_cp, compute_level, LevelSolver};
pub use pokemon::{OcrSnapshot, ScanStatus, ScannedPokemon};
pub use stats::{BaseStats, Ivs};
