pub mod catalog;
pub mod config;
pub mod economy;
pub mod engine;
pub mod error;
pub mod events;
pub mod feed;
pub mod grid;
pub mod notify;
pub mod plan;
pub mod rng;
pub mod session;
pub mod state;
pub mod stats;
pub mod web;

pub use catalog::Catalog;
pub use config::GameConfig;
pub use engine::{Engine, EngineBuilder};
pub use error::GameError;
pub use session::Session;
