//! Species base stats and individual values

use serde::{Deserialize, Serialize};

/// Highest value a single IV can take
pub const MAX_IV: u8 = 15;

/// Per-species base stats, supplied by the species data service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseStats {
    pub atk: u32,
    pub def: u32,
    pub sta: u32,
}

impl BaseStats {
    pub fn new(atk: u32, def: u32, sta: u32) -> Self {
        Self { atk, def, sta }
    }

    /// Whether every stat is present (non-zero)
    pub fn is_complete(&self) -> bool {
        self.atk > 0 && self.def > 0 && self.sta > 0
    }
}

/// Individual values, each in `0..=15`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ivs {
    pub atk: u8,
    pub def: u8,
    pub sta: u8,
}

impl Ivs {
    /// Build IVs, rejecting any value above 15
    pub fn new(atk: u8, def: u8, sta: u8) -> Option<Self> {
        if atk > MAX_IV || def > MAX_IV || sta > MAX_IV {
            return None;
        }
        Some(Self { atk, def, sta })
    }

    /// Perfect 15/15/15 IVs
    pub fn perfect() -> Self {
        Self {
            atk: MAX_IV,
            def: MAX_IV,
            sta: MAX_IV,
        }
    }

    pub fn total(&self) -> u32 {
        self.atk as u32 + self.def as u32 + self.sta as u32
    }

    /// Appraisal percentage, `round(100 * total / 45)`
    pub fn percent(&self) -> u32 {
        (100.0 * self.total() as f64 / (3 * MAX_IV as u32) as f64).round() as u32
    }

    /// Whether every value is within range. Deserialized IVs skip `new`.
    pub fn is_valid(&self) -> bool {
        self.atk <= MAX_IV && self.def <= MAX_IV && self.sta <= MAX_IV
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iv_range() {
        assert!(Ivs::new(15, 15, 15).is_some());
        assert!(Ivs::new(0, 0, 0).is_some());
        assert!(Ivs::new(16, 0, 0).is_none());
        assert!(Ivs::new(0, 0, 200).is_none());
    }

    #[test]
    fn test_iv_percent() {
        assert_eq!(Ivs::perfect().percent(), 100);
        assert_eq!(Ivs::new(0, 0, 0).unwrap().percent(), 0);
        // 30 / 45 = 66.67
        assert_eq!(Ivs::new(10, 10, 10).unwrap().percent(), 67);
        // 22 / 45 = 48.89
        assert_eq!(Ivs::new(7, 7, 8).unwrap().percent(), 49);
    }

    #[test]
    fn test_base_stats_completeness() {
        assert!(BaseStats::new(112, 96, 111).is_complete());
        assert!(!BaseStats::new(112, 0, 111).is_complete());
    }
}
