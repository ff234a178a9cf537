//! Neighbor Influence Weighting
//!
//! Turns follow relations and topic-scoped reactions into one scalar weight
//! per neighbor. Weights from different sources add up.

use std::collections::BTreeMap;

use feed_events::{ReactionKind, RoundId, TopicId, UserId};
use serde::{Deserialize, Serialize};

use crate::clock::observation_round;
use crate::graph::followees;
use crate::store::SocialStore;

/// Weight of a currently followed user.
pub const FOLLOW_WEIGHT: f64 = 1.0;
/// Weight added to an author per liked post on the topic.
pub const LIKE_WEIGHT: f64 = 0.2;
/// Weight added to an author per disliked post on the topic.
pub const DISLIKE_WEIGHT: f64 = -0.2;

/// Per-source influence weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluenceWeights {
    pub follow_weight: f64,
    pub like_weight: f64,
    pub dislike_weight: f64,
}

impl Default for InfluenceWeights {
    fn default() -> Self {
        Self {
            follow_weight: FOLLOW_WEIGHT,
            like_weight: LIKE_WEIGHT,
            dislike_weight: DISLIKE_WEIGHT,
        }
    }
}

impl InfluenceWeights {
    pub fn reaction_weight(&self, kind: ReactionKind) -> f64 {
        match kind {
            ReactionKind::Like => self.like_weight,
            ReactionKind::Dislike => self.dislike_weight,
            ReactionKind::Other => 0.0,
        }
    }
}

/// Neighbor id to accumulated weight. Empty means no social signal.
pub type NeighborWeights = BTreeMap<UserId, f64>;

/// Computes the influence each neighbor has on `user` for `topic`.
///
/// Followed users get `follow_weight`. Authors of topic posts the user reacted
/// to after `since_round` get the reaction's weight per reaction; `None`
/// counts every reaction ever made. Reactions to the user's own posts and a
/// self-follow weigh the user like any other neighbor.
pub fn compute_weights<S: SocialStore + ?Sized>(
    store: &S,
    weights: &InfluenceWeights,
    user: UserId,
    topic: TopicId,
    since_round: Option<RoundId>,
) -> NeighborWeights {
    let mut result = NeighborWeights::new();

    for followee in followees(store, user, observation_round(store)) {
        *result.entry(followee).or_default() += weights.follow_weight;
    }

    for reaction in store.reactions_by(user) {
        if since_round.map_or(false, |since| reaction.round <= since) {
            continue;
        }
        let Some(post) = store.post(reaction.post) else {
            continue;
        };
        if !post.has_topic(topic) {
            continue;
        }
        *result.entry(post.author).or_default() += weights.reaction_weight(reaction.kind);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use feed_events::{FollowEvent, ReactionEvent, SeedPost, User};

    const TOPIC: &str = "climate";

    fn store() -> (MemoryStore, TopicId) {
        let mut store = MemoryStore::new();
        store.add_round(0);
        for (id, name) in [(1, "reader"), (2, "friend"), (3, "stranger"), (4, "troll")] {
            store.add_user(User::new(id, name)).unwrap();
        }
        let topic = store.ensure_topic(TOPIC);
        store.ensure_topic("economy");
        (store, topic)
    }

    fn post(store: &mut MemoryStore, author: UserId, topic: &str, round: RoundId) -> u64 {
        store
            .publish(&SeedPost {
                author,
                round,
                topics: vec![topic.to_string()],
                ..SeedPost::default()
            })
            .unwrap()
    }

    fn assert_weight(weights: &NeighborWeights, user: UserId, expected: f64) {
        let actual = weights.get(&user).copied().unwrap_or(f64::NAN);
        assert!(
            (actual - expected).abs() < 1e-9,
            "weight of {user}: expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_no_signal_is_empty() {
        let (store, topic) = store();
        let weights = compute_weights(&store, &InfluenceWeights::default(), 1, topic, None);
        assert!(weights.is_empty());
    }

    #[test]
    fn test_follow_and_reactions_accumulate() {
        let (mut store, topic) = store();
        store.add_follow(FollowEvent::follow(1, 2, 0)).unwrap();
        let friend_post = post(&mut store, 2, TOPIC, 1);
        let stranger_post = post(&mut store, 3, TOPIC, 1);
        let troll_post = post(&mut store, 4, TOPIC, 1);
        store
            .add_reaction(ReactionEvent::new(friend_post, 1, ReactionKind::Like, 2))
            .unwrap();
        store
            .add_reaction(ReactionEvent::new(stranger_post, 1, ReactionKind::Like, 2))
            .unwrap();
        store
            .add_reaction(ReactionEvent::new(troll_post, 1, ReactionKind::Dislike, 2))
            .unwrap();

        let weights = compute_weights(&store, &InfluenceWeights::default(), 1, topic, None);

        assert_eq!(weights.len(), 3);
        assert_weight(&weights, 2, 1.2);
        assert_weight(&weights, 3, 0.2);
        assert_weight(&weights, 4, -0.2);
    }

    #[test]
    fn test_unfollowed_users_carry_no_follow_weight() {
        let (mut store, topic) = store();
        store.add_follow(FollowEvent::follow(1, 2, 0)).unwrap();
        store.add_round(3);
        store.add_follow(FollowEvent::unfollow(1, 2, 3)).unwrap();

        let weights = compute_weights(&store, &InfluenceWeights::default(), 1, topic, None);
        assert!(weights.is_empty());
    }

    #[test]
    fn test_reactions_filtered_by_topic_and_round() {
        let (mut store, topic) = store();
        let on_topic_old = post(&mut store, 2, TOPIC, 0);
        let on_topic_new = post(&mut store, 3, TOPIC, 0);
        let off_topic = post(&mut store, 4, "economy", 0);
        store
            .add_reaction(ReactionEvent::new(on_topic_old, 1, ReactionKind::Like, 2))
            .unwrap();
        store
            .add_reaction(ReactionEvent::new(on_topic_new, 1, ReactionKind::Like, 5))
            .unwrap();
        store
            .add_reaction(ReactionEvent::new(off_topic, 1, ReactionKind::Like, 5))
            .unwrap();

        let weights = compute_weights(&store, &InfluenceWeights::default(), 1, topic, Some(2));

        assert_eq!(weights.len(), 1);
        assert_weight(&weights, 3, 0.2);
    }

    #[test]
    fn test_own_posts_weigh_the_author() {
        let (mut store, topic) = store();
        let own = post(&mut store, 1, TOPIC, 0);
        store
            .add_reaction(ReactionEvent::new(own, 1, ReactionKind::Like, 1))
            .unwrap();

        let weights = compute_weights(&store, &InfluenceWeights::default(), 1, topic, None);
        assert_eq!(weights.len(), 1);
        assert_weight(&weights, 1, 0.2);
    }

    #[test]
    fn test_other_reactions_weigh_nothing() {
        let weights = InfluenceWeights::default();
        assert_eq!(weights.reaction_weight(ReactionKind::Other), 0.0);
        assert_eq!(weights.reaction_weight(ReactionKind::Like), LIKE_WEIGHT);
        assert_eq!(weights.reaction_weight(ReactionKind::Dislike), DISLIKE_WEIGHT);
    }
}
