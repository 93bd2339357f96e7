//! Transient user-facing messages. Delivery is fire-and-forget: a notifier
//! cannot fail and nothing in the rules reads what it was sent.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{EnergySource, EventDef},
    economy::PlacementQuote,
    state::Badge,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Placed,
    Replaced,
    Removed,
    InsufficientBudget,
    Event,
    NewYear,
    GameEnded,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub at: DateTime<Utc>,
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            kind,
            message: message.into(),
        }
    }

    pub fn placed(source: &EnergySource, quote: &PlacementQuote) -> Self {
        if quote.is_replacement() {
            Self::new(
                NoticeKind::Replaced,
                format!(
                    "{} successfully replaced! Net cost: ${}M",
                    source.name, quote.net_cost
                ),
            )
        } else {
            Self::new(
                NoticeKind::Placed,
                format!(
                    "{} successfully placed! Cost: ${}M",
                    source.name, quote.actual_cost
                ),
            )
        }
    }

    pub fn insufficient_budget(quote: &PlacementQuote) -> Self {
        let message = if quote.is_replacement() {
            format!(
                "Not enough budget! Replacing costs {} (new: {}, refund: {})",
                quote.net_cost, quote.actual_cost, quote.refund_amount
            )
        } else {
            format!(
                "Not enough budget! This energy source costs {} on this terrain (base cost: {}, terrain modifier: {}x)",
                quote.actual_cost, quote.base_cost, quote.cost_modifier
            )
        };
        Self::new(NoticeKind::InsufficientBudget, message)
    }

    pub fn removed(source: &EnergySource, refund: i64) -> Self {
        Self::new(
            NoticeKind::Removed,
            format!("{} removed! Refunded: ${}M", source.name, refund),
        )
    }

    pub fn event(event: &EventDef) -> Self {
        Self::new(
            NoticeKind::Event,
            format!("{}: {}", event.name, event.description),
        )
    }

    pub fn new_year(year: u32) -> Self {
        Self::new(
            NoticeKind::NewYear,
            format!("Welcome to Year {year}! Keep building your energy grid."),
        )
    }

    pub fn game_ended(badges: &[Badge]) -> Self {
        let message = if badges.is_empty() {
            "Game complete! No badges earned this time.".to_string()
        } else {
            let labels: Vec<&str> = badges.iter().map(|badge| badge.label()).collect();
            format!("Game complete! Badges earned: {}", labels.join(", "))
        };
        Self::new(NoticeKind::GameEnded, message)
    }

    pub fn reset() -> Self {
        Self::new(NoticeKind::Reset, "New game started.")
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::info!(kind = ?notice.kind, "{}", notice.message);
    }
}

/// Keeps every notice; cloned handles share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn kinds(&self) -> Vec<NoticeKind> {
        self.notices().iter().map(|notice| notice.kind).collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut guard) = self.notices.lock() {
            guard.push(notice);
        }
    }
}
