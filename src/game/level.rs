//! Level inversion from observed CP
//!
//! Searches the CPM table for the level whose predicted CP lands closest
//! to the value read off the screen.

use std::collections::HashMap;

use super::cpm::CpmTable;
use super::stats::{BaseStats, Ivs};

/// CP never displays below this value
pub const MIN_CP: u32 = 10;

/// Predicted CP for a given multiplier, saturating at `u32::MAX`
pub fn compute_cp(base: &BaseStats, ivs: &Ivs, cpm: f64) -> u32 {
    let atk = f64::from(base.atk) + f64::from(ivs.atk);
    let def = f64::from(base.def) + f64::from(ivs.def);
    let sta = f64::from(base.sta) + f64::from(ivs.sta);

    let cp = (atk * def.sqrt() * sta.sqrt() * cpm * cpm / 10.0).floor() as u32;
    cp.max(MIN_CP)
}

/// Best-fit level for an observed CP.
///
/// Levels are tried in ascending order and only a strictly smaller CP
/// difference replaces the current best, so exact ties resolve to the
/// lowest level. Returns `None` when the CP or any base stat is missing.
pub fn compute_level(
    observed_cp: u32,
    base: &BaseStats,
    ivs: &Ivs,
    table: &CpmTable,
) -> Option<f64> {
    if observed_cp == 0 || !base.is_complete() || !ivs.is_valid() {
        return None;
    }

    let mut best: Option<(f64, u32)> = None;
    for (level, cpm) in table.iter() {
        let diff = compute_cp(base, ivs, cpm).abs_diff(observed_cp);
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((level, diff)),
        }
    }

    best.map(|(level, _)| level)
}

/// Memoizing wrapper around [`compute_level`] for batch re-solving
pub struct LevelSolver {
    table: CpmTable,
    cache: HashMap<(u32, BaseStats, Ivs), Option<f64>>,
}

impl LevelSolver {
    pub fn new(table: CpmTable) -> Self {
        Self {
            table,
            cache: HashMap::new(),
        }
    }

    pub fn solve(&mut self, observed_cp: u32, base: &BaseStats, ivs: &Ivs) -> Option<f64> {
        let table = self.table;
        *self
            .cache
            .entry((observed_cp, *base, *ivs))
            .or_insert_with(|| compute_level(observed_cp, base, ivs, &table))
    }

    /// Number of memoized inputs
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl Default for LevelSolver {
    fn default() -> Self {
        Self::new(CpmTable::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIKACHU: BaseStats = BaseStats {
        atk: 112,
        def: 96,
        sta: 111,
    };

    #[test]
    fn test_huge_base_stats_saturate() {
        let table = CpmTable::standard();
        let huge = BaseStats {
            atk: u32::MAX,
            def: 96,
            sta: 111,
        };
        let ivs = Ivs::perfect();

        assert_eq!(compute_cp(&huge, &ivs, table.multiplier(20.0).unwrap()), u32::MAX);
        // Every prediction overshoots, so the lowest level is closest
        assert_eq!(compute_level(500, &huge, &ivs, &table), Some(1.0));
    }

    #[test]
    fn test_compute_cp_known_values() {
        let table = CpmTable::standard();
        let ivs = Ivs::perfect();

        assert_eq!(compute_cp(&PIKACHU, &ivs, table.multiplier(20.0).unwrap()), 536);
        assert_eq!(compute_cp(&PIKACHU, &ivs, table.multiplier(40.0).unwrap()), 938);
        assert_eq!(compute_cp(&PIKACHU, &ivs, table.multiplier(51.0).unwrap()), 1073);
    }

    #[test]
    fn test_compute_cp_floor() {
        let weak = BaseStats::new(10, 10, 10);
        let ivs = Ivs::new(0, 0, 0).unwrap();
        assert_eq!(compute_cp(&weak, &ivs, 0.094), MIN_CP);
    }

    #[test]
    fn test_round_trip_every_level() {
        let table = CpmTable::standard();
        let ivs_sets = [
            Ivs::perfect(),
            Ivs::new(0, 0, 0).unwrap(),
            Ivs::new(10, 12, 8).unwrap(),
        ];

        for ivs in ivs_sets {
            for (level, cpm) in table.iter() {
                let cp = compute_cp(&PIKACHU, &ivs, cpm);
                let solved = compute_level(cp, &PIKACHU, &ivs, &table).unwrap();

                // Never above the true level, and always reproduces the CP
                assert!(solved <= level);
                let solved_cpm = table.multiplier(solved).unwrap();
                assert_eq!(compute_cp(&PIKACHU, &ivs, solved_cpm), cp);
            }
        }
    }

    #[test]
    fn test_exact_levels() {
        let table = CpmTable::standard();
        let ivs = Ivs::perfect();

        assert_eq!(compute_level(536, &PIKACHU, &ivs, &table), Some(20.0));
        assert_eq!(compute_level(549, &PIKACHU, &ivs, &table), Some(20.5));
        assert_eq!(compute_level(938, &PIKACHU, &ivs, &table), Some(40.0));

        let mew = BaseStats::new(210, 210, 225);
        assert_eq!(compute_level(3307, &mew, &ivs, &table), Some(41.0));
    }

    #[test]
    fn test_out_of_range_cp_clamps_to_table_ends() {
        let table = CpmTable::standard();
        let ivs = Ivs::perfect();

        assert_eq!(compute_level(99_999, &PIKACHU, &ivs, &table), Some(51.0));
        assert_eq!(compute_level(5, &PIKACHU, &ivs, &table), Some(1.0));
    }

    #[test]
    fn test_ties_prefer_lowest_level() {
        let table = CpmTable::standard();
        let weak = BaseStats::new(10, 10, 10);
        let ivs = Ivs::new(0, 0, 0).unwrap();

        // Several low levels floor to CP 10
        assert_eq!(compute_level(10, &weak, &ivs, &table), Some(1.0));
    }

    #[test]
    fn test_monotonic_in_cp() {
        let table = CpmTable::standard();
        let ivs = Ivs::new(10, 12, 8).unwrap();

        let mut previous = 0.0;
        for cp in 1..1200 {
            let level = compute_level(cp, &PIKACHU, &ivs, &table).unwrap();
            assert!(level >= previous, "cp {} went from {} to {}", cp, previous, level);
            previous = level;
        }
    }

    #[test]
    fn test_missing_inputs() {
        let table = CpmTable::standard();
        let ivs = Ivs::perfect();

        assert_eq!(compute_level(0, &PIKACHU, &ivs, &table), None);
        assert_eq!(compute_level(500, &BaseStats::new(0, 96, 111), &ivs, &table), None);
    }

    #[test]
    fn test_solver_memoizes() {
        let mut solver = LevelSolver::default();
        let ivs = Ivs::perfect();

        assert_eq!(solver.solve(536, &PIKACHU, &ivs), Some(20.0));
        assert_eq!(solver.solve(536, &PIKACHU, &ivs), Some(20.0));
        assert_eq!(solver.cached(), 1);

        solver.solve(938, &PIKACHU, &ivs);
        assert_eq!(solver.cached(), 2);
    }
}
