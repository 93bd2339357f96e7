use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FEED_CAPACITY: usize = 5;

/// Citizen comments, newest first, bounded to `capacity` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialFeed {
    capacity: usize,
    entries: Vec<String>,
}

impl SocialFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn with_comment(&self, comment: impl Into<String>) -> Self {
        let mut entries = Vec::with_capacity(self.capacity);
        entries.push(comment.into());
        entries.extend(
            self.entries
                .iter()
                .take(self.capacity.saturating_sub(1))
                .cloned(),
        );
        entries.truncate(self.capacity);
        Self {
            capacity: self.capacity,
            entries,
        }
    }

    /// Prepends a comment drawn uniformly from `pool`; unchanged if the pool is empty.
    pub fn with_random_comment<R: Rng>(&self, pool: &[String], rng: &mut R) -> Self {
        match pool.choose(rng) {
            Some(comment) => self.with_comment(comment.clone()),
            None => self.clone(),
        }
    }
}

impl Default for SocialFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}
