//! Seeded randomness for a session. Every consumer draws from its own ChaCha
//! stream under the same key, so drawing comments never shifts which events
//! a seed produces.

use std::collections::HashMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RngStream {
    Events,
    Feed,
}

impl RngStream {
    fn id(self) -> u64 {
        match self {
            RngStream::Events => 1,
            RngStream::Feed => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RngManager {
    seed: u64,
    streams: HashMap<RngStream, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            streams: HashMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The generator for `stream`, created on first use. Creation order does
    /// not matter: each stream depends only on the seed and its own id.
    pub fn stream(&mut self, stream: RngStream) -> &mut ChaCha8Rng {
        let seed = self.seed;
        self.streams.entry(stream).or_insert_with(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(stream.id());
            rng
        })
    }
}
