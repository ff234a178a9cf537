//! Social Records
//!
//! Users plus the two append-only logs the social graph is derived from:
//! follow events and reactions.

use serde::{Deserialize, Serialize};

use crate::content::PostId;
use crate::round::RoundId;

/// Identifier of a simulated user.
pub type UserId = u64;

/// A registered simulation account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Political leaning, used to pair readers with news pages
    #[serde(default)]
    pub leaning: Option<String>,
    /// News page accounts publish articles rather than opinions
    #[serde(default)]
    pub is_page: bool,
    /// Round the account was registered in
    #[serde(default)]
    pub joined_on: RoundId,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            leaning: None,
            is_page: false,
            joined_on: 0,
        }
    }

    pub fn with_leaning(mut self, leaning: impl Into<String>) -> Self {
        self.leaning = Some(leaning.into());
        self
    }

    pub fn as_page(mut self) -> Self {
        self.is_page = true;
        self
    }

    pub fn joined_on(mut self, round: RoundId) -> Self {
        self.joined_on = round;
        self
    }
}

/// What a follow event did to the relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowAction {
    Follow,
    Unfollow,
}

/// One follow or unfollow issued by `actor` towards `target`.
///
/// The current relation between a pair is the action of its latest event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEvent {
    pub actor: UserId,
    pub target: UserId,
    pub action: FollowAction,
    pub round: RoundId,
}

impl FollowEvent {
    pub fn follow(actor: UserId, target: UserId, round: RoundId) -> Self {
        Self {
            actor,
            target,
            action: FollowAction::Follow,
            round,
        }
    }

    pub fn unfollow(actor: UserId, target: UserId, round: RoundId) -> Self {
        Self {
            actor,
            target,
            action: FollowAction::Unfollow,
            round,
        }
    }
}

/// Reaction types. Anything the simulation sends besides like/dislike is
/// kept as `Other` and carries no influence weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Like,
    Dislike,
    #[serde(other)]
    Other,
}

/// A user's reaction to a post. At most one per (post, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub post: PostId,
    pub user: UserId,
    pub kind: ReactionKind,
    pub round: RoundId,
}

impl ReactionEvent {
    pub fn new(post: PostId, user: UserId, kind: ReactionKind, round: RoundId) -> Self {
        Self {
            post,
            user,
            kind,
            round,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_action_serialization() {
        assert_eq!(serde_json::to_string(&FollowAction::Follow).unwrap(), r#""follow""#);
        assert_eq!(
            serde_json::to_string(&FollowAction::Unfollow).unwrap(),
            r#""unfollow""#
        );
    }

    #[test]
    fn test_unknown_reaction_kind_is_other() {
        let kind: ReactionKind = serde_json::from_str(r#""share""#).unwrap();
        assert_eq!(kind, ReactionKind::Other);

        let kind: ReactionKind = serde_json::from_str(r#""dislike""#).unwrap();
        assert_eq!(kind, ReactionKind::Dislike);
    }

    #[test]
    fn test_user_defaults_from_json() {
        let user: User = serde_json::from_str(r#"{"id": 3, "username": "ada"}"#).unwrap();
        assert_eq!(user.id, 3);
        assert!(!user.is_page);
        assert!(user.leaning.is_none());
        assert_eq!(user.joined_on, 0);
    }
}
