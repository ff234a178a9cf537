//! Content Records
//!
//! Posts, the topics they are about, and mentions of users inside them.

use serde::{Deserialize, Serialize};

use crate::round::RoundId;
use crate::social::UserId;

/// Identifier of a post or comment.
pub type PostId = u64;

/// Identifier of a topic of interest.
pub type TopicId = u64;

/// Identifier of a mention row.
pub type MentionId = u64;

/// A named interest. Referenced by id everywhere after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
}

impl Topic {
    pub fn new(id: TopicId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A post or a comment.
///
/// Root posts have `thread_id == id` and no `comment_to`. Comments share the
/// root's `thread_id` and inherit its topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: UserId,
    pub thread_id: PostId,
    #[serde(default)]
    pub comment_to: Option<PostId>,
    pub round: RoundId,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topic_ids: Vec<TopicId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hashtags: Vec<String>,
    /// Set when the post shares a news article
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<u64>,
}

impl Post {
    /// Creates a thread root.
    pub fn root(id: PostId, author: UserId, round: RoundId) -> Self {
        Self {
            id,
            author,
            thread_id: id,
            comment_to: None,
            round,
            text: String::new(),
            topic_ids: Vec::new(),
            hashtags: Vec::new(),
            article_id: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_topics(mut self, topic_ids: Vec<TopicId>) -> Self {
        self.topic_ids = topic_ids;
        self
    }

    pub fn with_hashtags(mut self, hashtags: Vec<String>) -> Self {
        self.hashtags = hashtags;
        self
    }

    pub fn with_article(mut self, article_id: u64) -> Self {
        self.article_id = Some(article_id);
        self
    }

    pub fn is_root(&self) -> bool {
        self.thread_id == self.id
    }

    pub fn is_article(&self) -> bool {
        self.article_id.is_some()
    }

    pub fn has_topic(&self, topic: TopicId) -> bool {
        self.topic_ids.contains(&topic)
    }
}

/// A post that mentions `user`. Delivered at most once through `answered`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub id: MentionId,
    pub user: UserId,
    pub post: PostId,
    pub round: RoundId,
    #[serde(default)]
    pub answered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_post_is_its_own_thread() {
        let post = Post::root(12, 1, 4);
        assert!(post.is_root());
        assert_eq!(post.thread_id, 12);
        assert!(post.comment_to.is_none());
    }

    #[test]
    fn test_post_builder() {
        let post = Post::root(1, 2, 3)
            .with_text("rates are rising")
            .with_topics(vec![5, 6])
            .with_hashtags(vec!["#economy".to_string()])
            .with_article(99);

        assert!(post.has_topic(5));
        assert!(!post.has_topic(7));
        assert!(post.is_article());
        assert_eq!(post.hashtags.len(), 1);
    }

    #[test]
    fn test_post_skips_empty_fields() {
        let json = serde_json::to_string(&Post::root(1, 2, 3)).unwrap();
        assert!(!json.contains("topic_ids"));
        assert!(!json.contains("hashtags"));
        assert!(!json.contains("article_id"));
    }
}
