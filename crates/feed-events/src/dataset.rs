//! Dataset Snapshots
//!
//! A dataset is the initial content of the store, written as the sequence of
//! collaborator writes that produced it. Loading replays it in order, so post
//! ids are assigned 1, 2, 3, ... in the order posts appear.

use serde::{Deserialize, Serialize};

use crate::content::PostId;
use crate::opinion::OpinionRecord;
use crate::round::RoundId;
use crate::social::{FollowEvent, ReactionEvent, User, UserId};

/// A post or comment to replay. Topics are given by name and created on demand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedPost {
    pub author: UserId,
    pub round: RoundId,
    #[serde(default)]
    pub text: String,
    /// Parent post; when set the seed is replayed as a comment
    #[serde(default)]
    pub comment_to: Option<PostId>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Usernames, with or without the leading `@`
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default)]
    pub article_id: Option<u64>,
}

/// Complete store snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub rounds: Vec<RoundId>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub posts: Vec<SeedPost>,
    #[serde(default)]
    pub follows: Vec<FollowEvent>,
    #[serde(default)]
    pub reactions: Vec<ReactionEvent>,
    #[serde(default)]
    pub opinions: Vec<OpinionRecord>,
}

impl Dataset {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dataset_parses() {
        let dataset = Dataset::from_json("{}").unwrap();
        assert!(dataset.rounds.is_empty());
        assert!(dataset.posts.is_empty());
    }

    #[test]
    fn test_seed_post_defaults() {
        let dataset = Dataset::from_json(
            r#"{"posts": [{"author": 1, "round": 2, "topics": ["climate"]}]}"#,
        )
        .unwrap();

        let seed = &dataset.posts[0];
        assert_eq!(seed.author, 1);
        assert!(seed.comment_to.is_none());
        assert!(seed.mentions.is_empty());
        assert_eq!(seed.topics, vec!["climate".to_string()]);
    }
}
