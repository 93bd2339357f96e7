use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{events::EffectDeltas, stats::YearStats};

pub const DEFAULT_BUDGET: i64 = 100;
pub const DEFAULT_MAX_YEARS: u32 = 5;
pub const DEFAULT_APPROVAL: f64 = 50.0;
pub const DEFAULT_RELIABILITY: f64 = 100.0;
pub const DEFAULT_DEMAND: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Building,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub budget: i64,
    pub year: u32,
    pub max_years: u32,
    pub emissions: f64,
    pub approval: f64,
    pub reliability: f64,
    /// Carried for the presentation layer; no rule reads it.
    pub demand: f64,
    pub game_over: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            year: 1,
            max_years: DEFAULT_MAX_YEARS,
            emissions: 0.0,
            approval: DEFAULT_APPROVAL,
            reliability: DEFAULT_RELIABILITY,
            demand: DEFAULT_DEMAND,
            game_over: false,
        }
    }
}

impl GameState {
    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::Ended
        } else {
            Phase::Building
        }
    }

    pub fn with_budget(&self, budget: i64) -> Self {
        Self {
            budget,
            ..self.clone()
        }
    }

    /// Folds one year of board totals and event deltas into a new snapshot.
    /// Budget is not floored here: event deltas may take it below zero.
    pub fn next_year(&self, stats: &YearStats, deltas: &EffectDeltas) -> Self {
        let year = self.year + 1;
        Self {
            budget: self.budget + deltas.budget.round() as i64,
            year,
            max_years: self.max_years,
            emissions: self.emissions + stats.emissions,
            approval: (self.approval + stats.approval_change + deltas.approval).clamp(0.0, 100.0),
            reliability: (stats.reliability + deltas.reliability).clamp(0.0, 100.0),
            demand: self.demand,
            game_over: year > self.max_years,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    EcoLeader,
    GreenAdvocate,
    GridGuardian,
    SteadySupply,
    PublicHero,
    RisingSupport,
    BudgetGenius,
    BudgetSurvivor,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::EcoLeader => "🌱 Eco Leader",
            Badge::GreenAdvocate => "🌿 Green Advocate",
            Badge::GridGuardian => "⚡ Grid Guardian",
            Badge::SteadySupply => "🔌 Steady Supply",
            Badge::PublicHero => "👑 Public Hero",
            Badge::RisingSupport => "📈 Rising Support",
            Badge::BudgetGenius => "💰 Budget Genius",
            Badge::BudgetSurvivor => "💵 Budget Survivor",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// At most one badge per category, the higher tier winning.
pub fn compute_badges(state: &GameState) -> Vec<Badge> {
    let mut badges = Vec::new();
    if state.emissions < 200.0 {
        badges.push(Badge::EcoLeader);
    } else if state.emissions < 400.0 {
        badges.push(Badge::GreenAdvocate);
    }

    if state.reliability >= 90.0 {
        badges.push(Badge::GridGuardian);
    } else if state.reliability >= 75.0 {
        badges.push(Badge::SteadySupply);
    }

    if state.approval >= 80.0 {
        badges.push(Badge::PublicHero);
    } else if state.approval >= 60.0 {
        badges.push(Badge::RisingSupport);
    }

    if state.budget > 20 {
        badges.push(Badge::BudgetGenius);
    } else if state.budget > 0 {
        badges.push(Badge::BudgetSurvivor);
    }
    badges
}

/// End-of-game figures as the results screen shows them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub emissions: i64,
    pub budget: i64,
    pub approval: i64,
    pub reliability: i64,
    pub badges: Vec<Badge>,
}

impl GameSummary {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            emissions: state.emissions.round() as i64,
            budget: state.budget,
            approval: state.approval.round() as i64,
            reliability: state.reliability.round() as i64,
            badges: compute_badges(state),
        }
    }
}
