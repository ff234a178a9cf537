//! Feed Simulation Engine
//!
//! Recommendation and opinion-dynamics core for a round-based social
//! network simulation. Agents read feeds, search hashtags, answer mentions
//! and update their opinions; every exposure is recorded as an audit row.

pub mod clock;
pub mod config;
pub mod error;
pub mod feed;
pub mod graph;
pub mod influence;
pub mod opinion;
pub mod output;
pub mod service;
pub mod store;

pub use config::{default_config_toml, ConfigError, EngineConfig};
pub use error::{EngineError, EngineResult};
pub use feed::{read_mentions, search, select_feed, FeedMode, FeedRequest};
pub use influence::{compute_weights, InfluenceWeights, NeighborWeights};
pub use opinion::{OpinionMethod, OpinionModel, OpinionUpdate};
pub use output::JsonlWriter;
pub use service::{Engine, Request, Response};
pub use store::{MemoryStore, ReactionOutcome, SocialStore};
