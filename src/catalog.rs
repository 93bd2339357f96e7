//! Static game data: energy sources, terrains, yearly events and the comment
//! pool. A [`Catalog`] is validated once when it is loaded and is shared
//! read-only (`Arc<Catalog>`) for the lifetime of a session.

use std::{collections::BTreeMap, fmt, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::CELL_COUNT;

pub const COST: &str = "cost";
pub const EMISSIONS: &str = "emissions";
pub const APPROVAL: &str = "approval";
pub const RELIABILITY: &str = "reliability";
pub const DEMAND: &str = "demand";

const BUILTIN_YAML: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/catalogs/watt_and_where.yaml"
));

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySource {
    pub id: SourceId,
    pub name: String,
    pub image: String,
    pub cost: i64,
    pub emissions: f64,
    pub reliability: f64,
    pub approval: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    pub name: String,
    pub emoji: String,
    #[serde(default)]
    pub modifier: BTreeMap<String, f64>,
}

impl Terrain {
    /// Multiplier for a metric name or a source id; absent keys count as 1.
    pub fn modifier(&self, key: &str) -> f64 {
        self.modifier.get(key).copied().unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EffectValue {
    Flat(f64),
    Nested(BTreeMap<String, f64>),
}

pub type Effect = BTreeMap<String, EffectValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDef {
    pub name: String,
    pub description: String,
    pub probability: f64,
    #[serde(default)]
    pub effect: Effect,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("catalog must define exactly {expected} terrains, found {found}")]
    TerrainCount { expected: usize, found: usize },

    #[error("catalog must define at least one energy source")]
    NoSources,

    #[error("energy source '{0}' defined more than once")]
    DuplicateSource(String),

    #[error("energy source '{id}' has non-positive cost {cost}")]
    InvalidCost { id: String, cost: i64 },

    #[error("terrain '{terrain}' has invalid modifier {key}={value}")]
    InvalidModifier {
        terrain: String,
        key: String,
        value: f64,
    },

    #[error("catalog must define at least one event")]
    NoEvents,

    #[error("event '{event}' has invalid probability weight {weight}")]
    InvalidWeight { event: String, weight: f64 },

    #[error("event probability weights must sum to more than zero")]
    ZeroTotalWeight,

    #[error("event probability weights sum to {0}, which is not a finite number")]
    InvalidTotalWeight(f64),

    #[error("event '{event}' targets unknown key '{key}'")]
    UnknownEffectKey { event: String, key: String },

    #[error("catalog must define at least one citizen comment")]
    NoComments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub sources: Vec<EnergySource>,
    pub terrains: Vec<Terrain>,
    pub events: Vec<EventDef>,
    pub comments: Vec<String>,
}

impl Catalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        Self::from_yaml_str(BUILTIN_YAML).expect("built-in catalog is valid")
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_yaml::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn source(&self, id: &str) -> Option<&EnergySource> {
        self.sources.iter().find(|source| source.id.as_str() == id)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.sources.is_empty() {
            return Err(CatalogError::NoSources);
        }
        let mut known: Vec<&str> = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            if known.contains(&source.id.as_str()) {
                return Err(CatalogError::DuplicateSource(source.id.to_string()));
            }
            if source.cost <= 0 {
                return Err(CatalogError::InvalidCost {
                    id: source.id.to_string(),
                    cost: source.cost,
                });
            }
            known.push(source.id.as_str());
        }

        if self.terrains.len() != CELL_COUNT {
            return Err(CatalogError::TerrainCount {
                expected: CELL_COUNT,
                found: self.terrains.len(),
            });
        }
        for terrain in &self.terrains {
            for (key, value) in &terrain.modifier {
                if !value.is_finite() || *value <= 0.0 {
                    return Err(CatalogError::InvalidModifier {
                        terrain: terrain.name.clone(),
                        key: key.clone(),
                        value: *value,
                    });
                }
            }
        }

        if self.events.is_empty() {
            return Err(CatalogError::NoEvents);
        }
        let mut total_weight = 0.0;
        for event in &self.events {
            if !event.probability.is_finite() || event.probability < 0.0 {
                return Err(CatalogError::InvalidWeight {
                    event: event.name.clone(),
                    weight: event.probability,
                });
            }
            total_weight += event.probability;
            self.validate_effect(event)?;
        }
        if !total_weight.is_finite() {
            return Err(CatalogError::InvalidTotalWeight(total_weight));
        }
        if total_weight <= 0.0 {
            return Err(CatalogError::ZeroTotalWeight);
        }

        if self.comments.is_empty() {
            return Err(CatalogError::NoComments);
        }
        Ok(())
    }

    fn validate_effect(&self, event: &EventDef) -> Result<(), CatalogError> {
        let unknown = |key: &str| CatalogError::UnknownEffectKey {
            event: event.name.clone(),
            key: key.to_string(),
        };
        for (key, value) in &event.effect {
            match value {
                EffectValue::Flat(_) => {
                    if ![COST, APPROVAL, RELIABILITY, DEMAND].contains(&key.as_str()) {
                        return Err(unknown(key.as_str()));
                    }
                }
                EffectValue::Nested(metrics) => {
                    if self.source(key).is_none() {
                        return Err(unknown(key.as_str()));
                    }
                    if let Some(metric) = metrics
                        .keys()
                        .find(|metric| ![COST, APPROVAL, RELIABILITY].contains(&metric.as_str()))
                    {
                        return Err(unknown(metric.as_str()));
                    }
                }
            }
        }
        Ok(())
    }
}
