//! The session controller: owns the current snapshot and swaps it wholesale
//! after every action, reporting outcomes through a [`Notifier`].

use serde::Serialize;

use crate::{
    catalog::EventDef,
    economy::PlacementQuote,
    engine::Engine,
    error::{GameError, Result},
    feed::SocialFeed,
    grid::Grid,
    notify::{Notice, Notifier},
    rng::RngManager,
    state::{GameState, GameSummary, Phase},
    stats::YearStats,
};

#[derive(Debug, Clone, Serialize)]
pub struct YearRecord {
    pub year: u32,
    pub event: Option<String>,
    pub stats: YearStats,
}

/// Everything a presentation layer needs to draw the current screen.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub phase: Phase,
    pub state: GameState,
    pub grid: Grid,
    pub stats: YearStats,
    pub feed: SocialFeed,
    pub current_event: Option<EventDef>,
    pub history: Vec<YearRecord>,
    pub summary: Option<GameSummary>,
}

pub struct Session {
    engine: Engine,
    rng: RngManager,
    notifier: Box<dyn Notifier>,
    grid: Grid,
    state: GameState,
    feed: SocialFeed,
    current_event: Option<EventDef>,
    history: Vec<YearRecord>,
}

impl Session {
    pub fn new(engine: Engine, seed: u64, notifier: impl Notifier + 'static) -> Self {
        let game = engine.reset_game();
        Self {
            engine,
            rng: RngManager::new(seed),
            notifier: Box::new(notifier),
            grid: game.grid,
            state: game.state,
            feed: game.feed,
            current_event: None,
            history: Vec::new(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn feed(&self) -> &SocialFeed {
        &self.feed
    }

    pub fn current_event(&self) -> Option<&EventDef> {
        self.current_event.as_ref()
    }

    pub fn history(&self) -> &[YearRecord] {
        &self.history
    }

    pub fn place(&mut self, cell_index: usize, source_id: &str) -> Result<PlacementQuote> {
        match self
            .engine
            .place_source(&self.grid, &self.state, cell_index, source_id)
        {
            Ok(placement) => {
                if let Some(source) = self.engine.catalog().source(source_id) {
                    self.notifier.notify(Notice::placed(source, &placement.quote));
                }
                tracing::debug!(
                    cell = cell_index,
                    source = source_id,
                    net_cost = placement.quote.net_cost,
                    "placed source"
                );
                self.grid = placement.grid;
                self.state = placement.state;
                Ok(placement.quote)
            }
            Err(err @ GameError::InsufficientBudget { .. }) => {
                // Re-quote for the full breakdown; this cannot fail where
                // placement already got as far as the budget check.
                if let Ok(quote) = self.engine.quote(&self.grid, cell_index, source_id) {
                    self.notifier.notify(Notice::insufficient_budget(&quote));
                }
                tracing::debug!(cell = cell_index, source = source_id, "placement rejected: {err}");
                Err(err)
            }
            Err(err) => {
                tracing::warn!(cell = cell_index, source = source_id, "placement failed: {err}");
                Err(err)
            }
        }
    }

    /// Returns the refund, zero when the cell was already empty.
    pub fn remove(&mut self, cell_index: usize) -> Result<i64> {
        let removal = self
            .engine
            .remove_source(&self.grid, &self.state, cell_index)
            .inspect_err(|err| tracing::warn!(cell = cell_index, "removal failed: {err}"))?;
        let previous = self.grid.cell(cell_index)?.source.clone();
        if let Some(source) = previous
            .as_ref()
            .and_then(|id| self.engine.catalog().source(id.as_str()))
        {
            self.notifier.notify(Notice::removed(source, removal.refund));
            tracing::debug!(cell = cell_index, refund = removal.refund, "removed source");
        }
        self.grid = removal.grid;
        self.state = removal.state;
        Ok(removal.refund)
    }

    pub fn next_year(&mut self) -> Result<&GameState> {
        let finished_year = self.state.year;
        let outcome = self
            .engine
            .advance_year(&self.grid, &self.state, &self.feed, &mut self.rng)?;
        if let Some(event) = &outcome.event {
            tracing::info!(year = finished_year, event = %event.name, "yearly event");
            self.notifier.notify(Notice::event(event));
        }
        self.history.push(YearRecord {
            year: finished_year,
            event: outcome.event.as_ref().map(|event| event.name.clone()),
            stats: outcome.stats,
        });
        self.state = outcome.state;
        self.feed = outcome.feed;
        self.current_event = outcome.event;

        if self.state.game_over {
            let badges = self.engine.compute_badges(&self.state);
            tracing::info!(
                budget = self.state.budget,
                emissions = self.state.emissions,
                approval = self.state.approval,
                reliability = self.state.reliability,
                badges = badges.len(),
                "game over"
            );
            self.notifier.notify(Notice::game_ended(&badges));
        } else {
            self.notifier.notify(Notice::new_year(self.state.year));
        }
        Ok(&self.state)
    }

    /// Starts over from the configured defaults. The RNG keeps running, so
    /// a new game does not replay the previous one's events.
    pub fn reset(&mut self) {
        let game = self.engine.reset_game();
        self.grid = game.grid;
        self.state = game.state;
        self.feed = game.feed;
        self.current_event = None;
        self.history.clear();
        tracing::info!("game reset");
        self.notifier.notify(Notice::reset());
    }

    pub fn summary(&self) -> Option<GameSummary> {
        self.state
            .game_over
            .then(|| GameSummary::from_state(&self.state))
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.state.phase(),
            state: self.state.clone(),
            grid: self.grid.clone(),
            stats: self.engine.preview_stats(&self.grid),
            feed: self.feed.clone(),
            current_event: self.current_event.clone(),
            history: self.history.clone(),
            summary: self.summary(),
        }
    }
}
