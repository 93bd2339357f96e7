use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Catalog, APPROVAL, EMISSIONS},
    grid::Grid,
};

pub const RELIABILITY_CAP: f64 = 100.0;

/// Totals for the board as it stands; recomputed from scratch every year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YearStats {
    pub emissions: f64,
    /// Mean terrain-adjusted reliability of placed sources, capped at 100.
    pub reliability: f64,
    pub approval_change: f64,
    pub count_placed: usize,
}

pub fn aggregate_stats(catalog: &Catalog, grid: &Grid) -> YearStats {
    let mut stats = YearStats::default();
    let mut reliability_sum = 0.0;
    for (cell, source_id) in grid.placed() {
        // Cells holding ids the catalog no longer knows contribute nothing.
        let Some(source) = catalog.source(source_id.as_str()) else {
            continue;
        };
        let terrain = &cell.terrain;
        stats.emissions += source.emissions * terrain.modifier(EMISSIONS);
        reliability_sum += source.reliability * terrain.modifier(source_id.as_str());
        stats.approval_change += source.approval * terrain.modifier(APPROVAL);
        stats.count_placed += 1;
    }
    if stats.count_placed > 0 {
        stats.reliability = (reliability_sum / stats.count_placed as f64).min(RELIABILITY_CAP);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_grid_is_all_zero() {
        let catalog = Catalog::builtin();
        let stats = aggregate_stats(&catalog, &Grid::new(&catalog));
        assert_eq!(stats, YearStats::default());
    }

    #[test]
    fn terrain_modifiers_apply_per_metric() {
        let catalog = Catalog::builtin();
        // City: approval x1.1; Camping Area: emissions x0.9
        let grid = Grid::new(&catalog)
            .with_source(0, Some("solar".into()))
            .and_then(|grid| grid.with_source(12, Some("coal".into())))
            .unwrap();
        let stats = aggregate_stats(&catalog, &grid);
        assert_eq!(stats.count_placed, 2);
        assert!(approx(stats.emissions, 2.0 + 80.0 * 0.9));
        assert!(approx(stats.approval_change, 15.0 * 1.1 + -10.0 * 1.1));
        assert!(approx(stats.reliability, (65.0 + 95.0) / 2.0));
    }

    #[test]
    fn reliability_is_capped() {
        let catalog = Catalog::builtin();
        // Mountains: hydro x1.6 -> 144
        let grid = Grid::new(&catalog)
            .with_source(8, Some("hydro".into()))
            .unwrap();
        let stats = aggregate_stats(&catalog, &grid);
        assert!(approx(stats.reliability, RELIABILITY_CAP));
    }

    #[test]
    fn source_specific_modifier_only_hits_that_source() {
        let catalog = Catalog::builtin();
        // High Plains: wind x1.5, solar x1.2
        let grid = Grid::new(&catalog)
            .with_source(6, Some("gas".into()))
            .unwrap();
        let stats = aggregate_stats(&catalog, &grid);
        assert!(approx(stats.reliability, 85.0));
    }
}
