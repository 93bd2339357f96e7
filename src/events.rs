//! Yearly events: one weighted draw per year, then the drawn effect is folded
//! into metric deltas.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Effect, EffectValue, EventDef, APPROVAL, COST, DEMAND, RELIABILITY};

/// Draws exactly one event, each with chance `weight / total_weight`.
/// Zero-weight events are never picked. Returns `None` when no event carries
/// positive weight or the weights do not sum to a finite total.
pub fn pick_event<'a, R: Rng>(events: &'a [EventDef], rng: &mut R) -> Option<&'a EventDef> {
    let total_weight: f64 = events.iter().map(|event| event.probability).sum();
    if !total_weight.is_finite() || total_weight <= 0.0 {
        return None;
    }
    let roll = rng.gen_range(0.0..total_weight);
    let mut cumulative = 0.0;
    for event in events {
        if event.probability <= 0.0 {
            continue;
        }
        cumulative += event.probability;
        if cumulative >= roll {
            return Some(event);
        }
    }
    // Float rounding can leave the roll just above the final sum.
    events.iter().rev().find(|event| event.probability > 0.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectDeltas {
    pub budget: f64,
    pub approval: f64,
    pub reliability: f64,
    /// Parsed from the `demand` key and reported, never applied.
    pub demand: Option<f64>,
}

impl EffectDeltas {
    fn add_metric(&mut self, metric: &str, value: f64) {
        match metric {
            COST => self.budget += value,
            APPROVAL => self.approval += value,
            RELIABILITY => self.reliability += value,
            _ => {}
        }
    }
}

/// Sums flat and source-scoped contributions per metric. Which source a
/// nested entry names does not matter: every nested value applies globally.
pub fn apply_effect(effect: &Effect) -> EffectDeltas {
    let mut deltas = EffectDeltas::default();
    for (key, value) in effect {
        match value {
            EffectValue::Flat(amount) if key == DEMAND => deltas.demand = Some(*amount),
            EffectValue::Flat(amount) => deltas.add_metric(key, *amount),
            EffectValue::Nested(metrics) => {
                for (metric, amount) in metrics {
                    deltas.add_metric(metric, *amount);
                }
            }
        }
    }
    deltas
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn event(name: &str, probability: f64) -> EventDef {
        EventDef {
            name: name.to_string(),
            description: String::new(),
            probability,
            effect: Effect::new(),
        }
    }

    #[test]
    fn weighted_draw_matches_weights() {
        let events = vec![
            event("a", 0.3),
            event("b", 0.2),
            event("c", 0.15),
            event("d", 0.25),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        let draws = 10_000;
        for _ in 0..draws {
            let picked = pick_event(&events, &mut rng).expect("positive total weight");
            *counts.entry(picked.name.as_str()).or_default() += 1;
        }
        assert_eq!(counts.len(), 4);
        assert_eq!(counts.values().sum::<u32>(), draws);
        for event in &events {
            let expected = event.probability / 0.9;
            let observed = counts[event.name.as_str()] as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.03,
                "{}: observed {observed:.3}, expected {expected:.3}",
                event.name
            );
        }
    }

    #[test]
    fn zero_weight_events_never_fire() {
        let events = vec![event("never", 0.0), event("always", 1.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..500 {
            assert_eq!(pick_event(&events, &mut rng).unwrap().name, "always");
        }
    }

    #[test]
    fn no_positive_weight_means_no_event() {
        let events = vec![event("never", 0.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(pick_event(&events, &mut rng).is_none());
        assert!(pick_event(&[], &mut rng).is_none());
    }

    #[test]
    fn overflowing_weights_draw_nothing() {
        let events = vec![event("a", f64::MAX), event("b", f64::MAX)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(pick_event(&events, &mut rng).is_none());
    }

    #[test]
    fn flat_and_nested_contributions_sum() {
        let effect = Effect::from([
            (APPROVAL.to_string(), EffectValue::Flat(4.0)),
            (
                "nuclear".to_string(),
                EffectValue::Nested(BTreeMap::from([
                    (APPROVAL.to_string(), -15.0),
                    (COST.to_string(), -10.0),
                ])),
            ),
            (
                "wind".to_string(),
                EffectValue::Nested(BTreeMap::from([(RELIABILITY.to_string(), -20.0)])),
            ),
        ]);
        let deltas = apply_effect(&effect);
        assert_eq!(deltas.approval, -11.0);
        assert_eq!(deltas.budget, -10.0);
        assert_eq!(deltas.reliability, -20.0);
        assert_eq!(deltas.demand, None);
    }

    #[test]
    fn demand_is_reported_but_inert() {
        let effect = Effect::from([(DEMAND.to_string(), EffectValue::Flat(1.2))]);
        let deltas = apply_effect(&effect);
        assert_eq!(deltas.demand, Some(1.2));
        assert_eq!(deltas.budget, 0.0);
        assert_eq!(deltas.approval, 0.0);
        assert_eq!(deltas.reliability, 0.0);
    }
}
