//! Placement costs and removal refunds. Both use the same terrain cost
//! modifier, so placing and removing a source on one cell nets to zero.

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Catalog, COST},
    error::{GameError, Result},
    grid::Cell,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementQuote {
    pub base_cost: i64,
    pub cost_modifier: f64,
    pub actual_cost: i64,
    pub refund_amount: i64,
    pub net_cost: i64,
}

impl PlacementQuote {
    pub fn is_replacement(&self) -> bool {
        self.refund_amount != 0
    }

    pub fn affordable(&self, budget: i64) -> bool {
        budget >= self.net_cost
    }

    pub fn shortfall(&self) -> GameError {
        GameError::InsufficientBudget {
            net_cost: self.net_cost,
            actual_cost: self.actual_cost,
            refund_amount: self.refund_amount,
        }
    }
}

fn scaled_cost(base_cost: i64, modifier: f64) -> i64 {
    (base_cost as f64 * modifier).round() as i64
}

pub fn compute_placement_cost(
    catalog: &Catalog,
    cell: &Cell,
    source_id: &str,
) -> Result<PlacementQuote> {
    let source = catalog
        .source(source_id)
        .ok_or_else(|| GameError::UnknownSource(source_id.to_string()))?;
    let cost_modifier = cell.terrain.modifier(COST);
    let actual_cost = scaled_cost(source.cost, cost_modifier);
    let refund_amount = compute_removal_refund(catalog, cell)?;
    Ok(PlacementQuote {
        base_cost: source.cost,
        cost_modifier,
        actual_cost,
        refund_amount,
        net_cost: actual_cost - refund_amount,
    })
}

/// Refund for clearing `cell`; zero when nothing is placed there.
pub fn compute_removal_refund(catalog: &Catalog, cell: &Cell) -> Result<i64> {
    let Some(existing) = cell.source.as_ref() else {
        return Ok(0);
    };
    let source = catalog
        .source(existing.as_str())
        .ok_or_else(|| GameError::UnknownSource(existing.to_string()))?;
    Ok(scaled_cost(source.cost, cell.terrain.modifier(COST)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn city_scales_cost() {
        let catalog = Catalog::builtin();
        let grid = Grid::new(&catalog);
        let quote = compute_placement_cost(&catalog, grid.cell(0).unwrap(), "wind").unwrap();
        assert_eq!(quote.actual_cost, 24);
        assert_eq!(quote.refund_amount, 0);
        assert_eq!(quote.net_cost, 24);
        assert!(!quote.is_replacement());
    }

    #[test]
    fn replacement_nets_out_refund() {
        let catalog = Catalog::builtin();
        // Industrial: cost x0.9
        let grid = Grid::new(&catalog)
            .with_source(4, Some("coal".into()))
            .unwrap();
        let quote = compute_placement_cost(&catalog, grid.cell(4).unwrap(), "nuclear").unwrap();
        assert_eq!(quote.actual_cost, 36);
        assert_eq!(quote.refund_amount, 27);
        assert_eq!(quote.net_cost, 9);
        assert!(quote.is_replacement());
    }

    #[test]
    fn replacing_with_cheaper_source_has_negative_net_cost() {
        let catalog = Catalog::builtin();
        let grid = Grid::new(&catalog)
            .with_source(24, Some("nuclear".into()))
            .unwrap();
        let quote = compute_placement_cost(&catalog, grid.cell(24).unwrap(), "wind").unwrap();
        assert_eq!(quote.net_cost, -20);
        assert!(quote.affordable(0));
    }

    #[test]
    fn empty_cell_refunds_nothing() {
        let catalog = Catalog::builtin();
        let grid = Grid::new(&catalog);
        assert_eq!(compute_removal_refund(&catalog, grid.cell(7).unwrap()), Ok(0));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let catalog = Catalog::builtin();
        let grid = Grid::new(&catalog);
        assert_eq!(
            compute_placement_cost(&catalog, grid.cell(0).unwrap(), "fusion"),
            Err(GameError::UnknownSource("fusion".to_string()))
        );
    }
}
