//! Shared record types and serialization for the feed simulation.
//!
//! This crate contains pure data structures with no engine logic.
//! It is a dependency for all other crates in the workspace.

pub mod audit;
pub mod content;
pub mod dataset;
pub mod jsonl;
pub mod opinion;
pub mod round;
pub mod social;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export round types
pub use round::{visibility_floor, RoundId};

// Re-export social graph records
pub use social::{FollowAction, FollowEvent, ReactionEvent, ReactionKind, User, UserId};

// Re-export content records
pub use content::{Mention, MentionId, Post, PostId, Topic, TopicId};

// Re-export opinion records
pub use opinion::{round_score, OpinionRecord};

// Re-export audit records
pub use audit::RecommendationAudit;

pub use dataset::{Dataset, SeedPost};
pub use jsonl::JsonlRecord;
