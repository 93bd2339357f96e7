//! The rules engine. Every operation takes the current snapshot by reference
//! and returns a new one; nothing here mutates its inputs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Catalog, CatalogError, EventDef},
    config::GameConfig,
    economy::{compute_placement_cost, compute_removal_refund, PlacementQuote},
    error::{GameError, Result},
    events::{apply_effect, pick_event, EffectDeltas},
    feed::SocialFeed,
    grid::Grid,
    rng::{RngManager, RngStream},
    state::{compute_badges, Badge, GameState},
    stats::{aggregate_stats, YearStats},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub grid: Grid,
    pub state: GameState,
    pub quote: PlacementQuote,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub grid: Grid,
    pub state: GameState,
    /// Zero when the cell was already empty.
    pub refund: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearOutcome {
    pub state: GameState,
    pub stats: YearStats,
    /// Always present for a validated catalog.
    pub event: Option<EventDef>,
    pub deltas: EffectDeltas,
    pub feed: SocialFeed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub grid: Grid,
    pub state: GameState,
    pub feed: SocialFeed,
}

pub struct EngineBuilder {
    config: GameConfig,
    catalog: Option<Arc<Catalog>>,
}

impl EngineBuilder {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            catalog: None,
        }
    }

    pub fn with_catalog(mut self, catalog: impl Into<Arc<Catalog>>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Validates the catalog before handing it to the engine, so every rule
    /// can rely on a full board and a drawable event table.
    pub fn build(self) -> std::result::Result<Engine, CatalogError> {
        let catalog = self
            .catalog
            .unwrap_or_else(|| Arc::new(Catalog::builtin()));
        catalog.validate()?;
        Ok(Engine {
            catalog,
            config: self.config,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    catalog: Arc<Catalog>,
    config: GameConfig,
}

impl Engine {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn reset_game(&self) -> NewGame {
        NewGame {
            grid: Grid::new(&self.catalog),
            state: self.config.initial_state(),
            feed: SocialFeed::new(self.config.feed_capacity),
        }
    }

    pub fn quote(&self, grid: &Grid, cell_index: usize, source_id: &str) -> Result<PlacementQuote> {
        compute_placement_cost(&self.catalog, grid.cell(cell_index)?, source_id)
    }

    /// Places (or replaces) a source. Either both grid and budget change or,
    /// on error, neither does.
    pub fn place_source(
        &self,
        grid: &Grid,
        state: &GameState,
        cell_index: usize,
        source_id: &str,
    ) -> Result<Placement> {
        if state.game_over {
            return Err(GameError::GameOver);
        }
        let quote = self.quote(grid, cell_index, source_id)?;
        if !quote.affordable(state.budget) {
            return Err(quote.shortfall());
        }
        let grid = grid.with_source(cell_index, Some(source_id.into()))?;
        Ok(Placement {
            grid,
            state: state.with_budget(state.budget - quote.net_cost),
            quote,
        })
    }

    pub fn remove_source(&self, grid: &Grid, state: &GameState, cell_index: usize) -> Result<Removal> {
        if state.game_over {
            return Err(GameError::GameOver);
        }
        let cell = grid.cell(cell_index)?;
        if cell.is_empty() {
            return Ok(Removal {
                grid: grid.clone(),
                state: state.clone(),
                refund: 0,
            });
        }
        let refund = compute_removal_refund(&self.catalog, cell)?;
        Ok(Removal {
            grid: grid.with_source(cell_index, None)?,
            state: state.with_budget(state.budget + refund),
            refund,
        })
    }

    pub fn preview_stats(&self, grid: &Grid) -> YearStats {
        aggregate_stats(&self.catalog, grid)
    }

    pub fn advance_year(
        &self,
        grid: &Grid,
        state: &GameState,
        feed: &SocialFeed,
        rng: &mut RngManager,
    ) -> Result<YearOutcome> {
        if state.game_over {
            return Err(GameError::GameOver);
        }
        let stats = aggregate_stats(&self.catalog, grid);
        let event = pick_event(&self.catalog.events, rng.stream(RngStream::Events)).cloned();
        let deltas = event
            .as_ref()
            .map(|event| apply_effect(&event.effect))
            .unwrap_or_default();
        let feed = feed.with_random_comment(&self.catalog.comments, rng.stream(RngStream::Feed));
        Ok(YearOutcome {
            state: state.next_year(&stats, &deltas),
            stats,
            event,
            deltas,
            feed,
        })
    }

    pub fn compute_badges(&self, state: &GameState) -> Vec<Badge> {
        compute_badges(state)
    }
}
