//! Scripted play-throughs: a list of actions per year, run through a
//! [`Session`] until the game ends.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::SourceId,
    error::GameError,
    session::Session,
    state::GameSummary,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanAction {
    Place { place: SourceId, cell: usize },
    Remove { remove: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub years: Vec<Vec<PlanAction>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanReport {
    pub applied: usize,
    /// Placements skipped because the budget could not cover them.
    pub skipped: usize,
    pub years_played: u32,
}

impl Plan {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan file {}", path.display()))?;
        serde_yaml::from_str(&data).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Plays every remaining year. Years past the end of the plan are played
    /// with no actions. An unaffordable placement is skipped; any other
    /// rule error aborts the run.
    pub fn run(&self, session: &mut Session) -> Result<(PlanReport, GameSummary)> {
        let mut report = PlanReport::default();
        let mut year_index = 0;
        while !session.state().game_over {
            for action in self.years.get(year_index).into_iter().flatten() {
                let outcome = match action {
                    PlanAction::Place { place, cell } => {
                        session.place(*cell, place.as_str()).map(|_| ())
                    }
                    PlanAction::Remove { remove } => session.remove(*remove).map(|_| ()),
                };
                match outcome {
                    Ok(()) => report.applied += 1,
                    Err(GameError::InsufficientBudget { .. }) => report.skipped += 1,
                    Err(err) => {
                        return Err(err).with_context(|| {
                            format!("plan action {action:?} failed in year {}", year_index + 1)
                        })
                    }
                }
            }
            session.next_year()?;
            report.years_played += 1;
            year_index += 1;
        }
        let summary = session
            .summary()
            .context("game ended without a summary")?;
        Ok((report, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_parse_from_compact_yaml() {
        let plan: Plan = serde_yaml::from_str(
            "years:\n  - - { place: wind, cell: 6 }\n    - { remove: 6 }\n  - []\n",
        )
        .unwrap();
        assert_eq!(plan.years.len(), 2);
        assert_eq!(
            plan.years[0],
            vec![
                PlanAction::Place {
                    place: SourceId::new("wind"),
                    cell: 6
                },
                PlanAction::Remove { remove: 6 }
            ]
        );
        assert!(plan.years[1].is_empty());
    }
}
