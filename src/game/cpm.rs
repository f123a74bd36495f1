//! Combat Power Multiplier table
//!
//! One multiplier per half level from 1.0 to 51.0.

/// Lowest level in the table
pub const MIN_LEVEL: f64 = 1.0;
/// Highest level in the table
pub const MAX_LEVEL: f64 = 51.0;
/// Number of half-level entries
pub const CPM_ENTRIES: usize = 101;

/// Multipliers indexed by `(level - 1.0) * 2`
const STANDARD_CPM: [f64; CPM_ENTRIES] = [
    0.094, 0.1351374318, 0.16639787, 0.192650919, 0.21573247, // 1.0 - 3.0
    0.2365726613, 0.25572005, 0.2735303812, 0.29024988, 0.3060573775, // 3.5 - 5.5
    0.3210876, 0.3354450362, 0.34921268, 0.3624577511, 0.3752356, // 6.0 - 8.0
    0.387592416, 0.39956728, 0.4111935514, 0.4225, 0.4329264091, // 8.5 - 10.5
    0.44310755, 0.4530599591, 0.4627984, 0.472336093, 0.48168495, // 11.0 - 13.0
    0.4908558003, 0.49985844, 0.508701765, 0.51739395, 0.5259425113, // 13.5 - 15.5
    0.5343543, 0.5426357375, 0.5507927, 0.5588305862, 0.5667545, // 16.0 - 18.0
    0.5745691333, 0.5822789, 0.5898879072, 0.5974, 0.6048236651, // 18.5 - 20.5
    0.6121573, 0.6194041216, 0.6265671, 0.6336491432, 0.64065295, // 21.0 - 23.0
    0.6475809666, 0.65443563, 0.6612192524, 0.667934, 0.6745818959, // 23.5 - 25.5
    0.6811649, 0.6876849038, 0.69414365, 0.70054287, 0.7068842, // 26.0 - 28.0
    0.7131691091, 0.7193991, 0.7255756136, 0.7317, 0.7347410093, // 28.5 - 30.5
    0.7377695, 0.7407855938, 0.74378943, 0.7467812109, 0.74976104, // 31.0 - 33.0
    0.7527290867, 0.75568551, 0.7586303683, 0.76156384, 0.7644860647, // 33.5 - 35.5
    0.76739717, 0.7702972656, 0.7731865, 0.7760649616, 0.77893275, // 36.0 - 38.0
    0.7817900548, 0.78463697, 0.7874736075, 0.7903, 0.792803968, // 38.5 - 40.5
    0.79530001, 0.797800015, 0.8003, 0.802799995, 0.8053, // 41.0 - 43.0
    0.8078, 0.81029999, 0.812799985, 0.81529999, 0.81779999, // 43.5 - 45.5
    0.82029999, 0.82279999, 0.82529999, 0.82779999, 0.83029999, // 46.0 - 48.0
    0.83279999, 0.83529999, 0.83779999, 0.84029999, 0.84279999, // 48.5 - 50.5
    0.84529999, // 51.0
];

/// Read-only level to multiplier mapping
#[derive(Debug, Clone, Copy)]
pub struct CpmTable {
    multipliers: &'static [f64; CPM_ENTRIES],
}

impl CpmTable {
    /// The table used by the game
    pub const fn standard() -> Self {
        Self {
            multipliers: &STANDARD_CPM,
        }
    }

    /// Iterate `(level, multiplier)` pairs in ascending level order
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.multipliers
            .iter()
            .enumerate()
            .map(|(idx, &cpm)| (MIN_LEVEL + idx as f64 * 0.5, cpm))
    }

    /// Multiplier for a level on the half-level lattice
    pub fn multiplier(&self, level: f64) -> Option<f64> {
        let idx = level_index(level)?;
        self.multipliers.get(idx).copied()
    }

    /// Whether the level is one of the table's half levels
    pub fn contains(&self, level: f64) -> bool {
        level_index(level).is_some_and(|idx| idx < CPM_ENTRIES)
    }

    pub fn len(&self) -> usize {
        CPM_ENTRIES
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for CpmTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn level_index(level: f64) -> Option<usize> {
    if !level.is_finite() || level < MIN_LEVEL {
        return None;
    }
    let doubled = (level - MIN_LEVEL) * 2.0;
    if doubled.fract() != 0.0 {
        return None;
    }
    Some(doubled as usize)
}
