//! Feed modes.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// How candidate posts are chosen. Unknown names select [`FeedMode::Random`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum FeedMode {
    /// Newest posts first
    Rchrono,
    /// Most reacted-to posts first, newest breaking ties
    RchronoPopularity,
    /// Followee posts by recency, topped up from everyone else
    RchronoFollowers,
    /// Followee posts by popularity, topped up from everyone else by recency
    RchronoFollowersPopularity,
    /// Uniform sample without replacement
    #[default]
    Random,
}

impl FeedMode {
    pub fn from_name(name: &str) -> Self {
        match name {
            "rchrono" => FeedMode::Rchrono,
            "rchrono_popularity" => FeedMode::RchronoPopularity,
            "rchrono_followers" => FeedMode::RchronoFollowers,
            "rchrono_followers_popularity" => FeedMode::RchronoFollowersPopularity,
            "random" => FeedMode::Random,
            other => {
                debug!(mode = other, "unknown feed mode, falling back to random");
                FeedMode::Random
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedMode::Rchrono => "rchrono",
            FeedMode::RchronoPopularity => "rchrono_popularity",
            FeedMode::RchronoFollowers => "rchrono_followers",
            FeedMode::RchronoFollowersPopularity => "rchrono_followers_popularity",
            FeedMode::Random => "random",
        }
    }
}

impl From<String> for FeedMode {
    fn from(name: String) -> Self {
        FeedMode::from_name(&name)
    }
}

impl fmt::Display for FeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
