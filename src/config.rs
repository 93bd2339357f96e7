use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::Catalog,
    feed::DEFAULT_FEED_CAPACITY,
    state::{
        GameState, DEFAULT_APPROVAL, DEFAULT_BUDGET, DEFAULT_DEMAND, DEFAULT_MAX_YEARS,
        DEFAULT_RELIABILITY,
    },
};

fn default_seed() -> u64 {
    7
}

fn default_budget() -> i64 {
    DEFAULT_BUDGET
}

fn default_max_years() -> u32 {
    DEFAULT_MAX_YEARS
}

fn default_approval() -> f64 {
    DEFAULT_APPROVAL
}

fn default_reliability() -> f64 {
    DEFAULT_RELIABILITY
}

fn default_demand() -> f64 {
    DEFAULT_DEMAND
}

fn default_feed_capacity() -> usize {
    DEFAULT_FEED_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_budget")]
    pub starting_budget: i64,
    #[serde(default = "default_max_years")]
    pub max_years: u32,
    #[serde(default = "default_approval")]
    pub starting_approval: f64,
    #[serde(default = "default_reliability")]
    pub starting_reliability: f64,
    #[serde(default = "default_demand")]
    pub starting_demand: f64,
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,
    /// Catalog file relative to the loader's base directory; the built-in
    /// catalog is used when absent.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: "watt_and_where".to_string(),
            description: None,
            seed: default_seed(),
            starting_budget: default_budget(),
            max_years: default_max_years(),
            starting_approval: default_approval(),
            starting_reliability: default_reliability(),
            starting_demand: default_demand(),
            feed_capacity: default_feed_capacity(),
            catalog: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl GameConfig {
    /// A zero-year game starts out already ended.
    pub fn initial_state(&self) -> GameState {
        let year = 1;
        GameState {
            budget: self.starting_budget,
            year,
            max_years: self.max_years,
            emissions: 0.0,
            approval: self.starting_approval.clamp(0.0, 100.0),
            reliability: self.starting_reliability.clamp(0.0, 100.0),
            demand: self.starting_demand,
            game_over: year > self.max_years,
        }
    }
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<GameConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GameConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn load_catalog(&self, config: &GameConfig) -> Result<Catalog> {
        match &config.catalog {
            Some(file) => Catalog::load(self.base_dir.join(file)),
            None => Ok(Catalog::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_fresh_game() {
        assert_eq!(GameConfig::default().initial_state(), GameState::default());
    }

    #[test]
    fn sparse_yaml_fills_in_defaults() {
        let config: GameConfig = serde_yaml::from_str("name: quick\nmax_years: 3\n").unwrap();
        assert_eq!(config.max_years, 3);
        assert_eq!(config.starting_budget, 100);
        assert_eq!(config.feed_capacity, 5);
        assert_eq!(config.logging.level, "info");
        assert!(config.catalog.is_none());
    }

    #[test]
    fn zero_year_game_starts_ended() {
        let config = GameConfig {
            max_years: 0,
            ..GameConfig::default()
        };
        let state = config.initial_state();
        assert_eq!(state.year, 1);
        assert!(state.game_over);
        assert_eq!(state.phase(), crate::state::Phase::Ended);
    }

    #[test]
    fn starting_approval_is_clamped() {
        let config = GameConfig {
            starting_approval: 140.0,
            ..GameConfig::default()
        };
        assert_eq!(config.initial_state().approval, 100.0);
    }
}
