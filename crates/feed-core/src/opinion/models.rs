//! The four opinion update models.

use feed_events::{OpinionRecord, TopicId, UserId};
use tracing::debug;

use super::{initial_record, latest_record};
use crate::clock::observation_round;
use crate::error::{EngineError, EngineResult};
use crate::graph::followees;
use crate::influence::{compute_weights, InfluenceWeights};
use crate::store::SocialStore;

/// History ordered newest first: by round, then by insertion.
fn newest_first(history: &[OpinionRecord]) -> Vec<&OpinionRecord> {
    let mut ordered: Vec<(usize, &OpinionRecord)> = history.iter().enumerate().collect();
    ordered.sort_by(|(ia, a), (ib, b)| (b.round, ib).cmp(&(a.round, ia)));
    ordered.into_iter().map(|(_, record)| record).collect()
}

/// Geometrically decayed mean of the whole history.
///
/// The newest score weighs 1, the one before `decay_factor`, then
/// `decay_factor²`, and so on. Returns 0 when there is no history; callers
/// should read that as "undefined" rather than as an opinion.
pub fn weighted_mean<S: SocialStore + ?Sized>(
    store: &S,
    user: UserId,
    topic: TopicId,
    decay_factor: f64,
) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut weight = 1.0;

    for record in newest_first(store.opinion_history(user, topic)) {
        weighted_sum += record.score * weight;
        total_weight += weight;
        weight *= decay_factor;
    }

    if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    }
}

/// Median of the whole history, averaging the middle pair for even lengths.
/// Returns 0 when there is no history.
pub fn median<S: SocialStore + ?Sized>(store: &S, user: UserId, topic: TopicId) -> f64 {
    let mut scores: Vec<f64> = store
        .opinion_history(user, topic)
        .iter()
        .map(|record| record.score)
        .collect();
    if scores.is_empty() {
        return 0.0;
    }

    scores.sort_by(f64::total_cmp);
    let mid = scores.len() / 2;
    if scores.len() % 2 == 0 {
        (scores[mid - 1] + scores[mid]) / 2.0
    } else {
        scores[mid]
    }
}

/// Friedkin-Johnsen update against the mean opinion of followed users.
///
/// `x(t+1) = (1 - λ)·anchor + λ·mean(peers)`, where the anchor is the initial
/// opinion, or the current one when `state_dependent`. Followed users with no
/// opinion on the topic are not peers. Without peers the current opinion is
/// returned unchanged.
pub fn friedkin_johnsen<S: SocialStore + ?Sized>(
    store: &S,
    user: UserId,
    topic: TopicId,
    susceptibility: f64,
    state_dependent: bool,
) -> EngineResult<f64> {
    let history = store.opinion_history(user, topic);
    let missing = || EngineError::MissingOpinion { user, topic };
    let current = latest_record(history).ok_or_else(missing)?.score;
    let anchor = if state_dependent {
        current
    } else {
        initial_record(history).ok_or_else(missing)?.score
    };

    let peer_scores: Vec<f64> = followees(store, user, observation_round(store))
        .into_iter()
        .filter_map(|peer| {
            let score = latest_record(store.opinion_history(peer, topic)).map(|r| r.score);
            if score.is_none() {
                debug!(user, peer, topic, "followed user has no opinion on topic");
            }
            score
        })
        .collect();

    if peer_scores.is_empty() {
        return Ok(current);
    }

    let peer_mean = peer_scores.iter().sum::<f64>() / peer_scores.len() as f64;
    Ok((1.0 - susceptibility) * anchor + susceptibility * peer_mean)
}

/// Friedkin-Johnsen update against the weighted mean of neighbor opinions.
///
/// The anchor is the current opinion, or `neutral_anchor` for a user with no
/// history. Neighbor weights count reactions made after the user's latest
/// opinion round; with no history every reaction counts. The total weight
/// covers every neighbor; neighbors with no opinion on the topic add nothing
/// to the weighted sum. A total weight of zero returns the anchor unchanged.
pub fn weighted_friedkin_johnsen<S: SocialStore + ?Sized>(
    store: &S,
    weights: &InfluenceWeights,
    neutral_anchor: f64,
    user: UserId,
    topic: TopicId,
    susceptibility: f64,
) -> f64 {
    let latest = latest_record(store.opinion_history(user, topic));
    let anchor = latest.map_or(neutral_anchor, |record| record.score);
    let since_round = latest.map(|record| record.round);

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for (neighbor, weight) in compute_weights(store, weights, user, topic, since_round) {
        total_weight += weight;
        if let Some(record) = latest_record(store.opinion_history(neighbor, topic)) {
            weighted_sum += weight * record.score;
        }
    }

    if total_weight.abs() <= f64::EPSILON {
        return anchor;
    }

    (1.0 - susceptibility) * anchor + susceptibility * (weighted_sum / total_weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use feed_events::{FollowEvent, ReactionEvent, ReactionKind, SeedPost, User};

    const READER: UserId = 1;
    const A: UserId = 2;
    const B: UserId = 3;
    const C: UserId = 4;

    fn store() -> (MemoryStore, TopicId) {
        let mut store = MemoryStore::new();
        store.add_round(0);
        for (id, name) in [(READER, "reader"), (A, "a"), (B, "b"), (C, "c")] {
            store.add_user(User::new(id, name)).unwrap();
        }
        let topic = store.ensure_topic("climate");
        (store, topic)
    }

    fn opinion(store: &mut MemoryStore, user: UserId, topic: TopicId, round: u64, score: f64) {
        store.add_round(round);
        store.seed_opinion(OpinionRecord::new(user, topic, round, score)).unwrap();
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_empty_history_is_neutral() {
        let (store, topic) = store();
        assert_eq!(weighted_mean(&store, READER, topic, 0.8), 0.0);
        assert_eq!(median(&store, READER, topic), 0.0);
    }

    #[test]
    fn test_weighted_mean_decays_older_scores() {
        let (mut store, topic) = store();
        opinion(&mut store, READER, topic, 0, 0.0);
        opinion(&mut store, READER, topic, 1, 1.0);

        // newest 1.0 weighs 1, older 0.0 weighs 0.5
        assert_close(weighted_mean(&store, READER, topic, 0.5), 1.0 / 1.5);
        assert_close(weighted_mean(&store, READER, topic, 1.0), 0.5);
        assert_close(weighted_mean(&store, READER, topic, 0.0), 1.0);
    }

    #[test]
    fn test_weighted_mean_orders_by_round() {
        let (mut store, topic) = store();
        opinion(&mut store, READER, topic, 4, 1.0);
        opinion(&mut store, READER, topic, 2, 0.0);

        assert_close(weighted_mean(&store, READER, topic, 0.0), 1.0);
    }

    #[test]
    fn test_median() {
        let (mut store, topic) = store();
        for (round, score) in [(0, 0.9), (1, 0.1), (2, 0.5)] {
            opinion(&mut store, READER, topic, round, score);
        }
        assert_close(median(&store, READER, topic), 0.5);

        opinion(&mut store, READER, topic, 3, 0.7);
        assert_close(median(&store, READER, topic), 0.6);
    }

    #[test]
    fn test_friedkin_johnsen_scenario() {
        let (mut store, topic) = store();
        opinion(&mut store, READER, topic, 0, 0.5);
        opinion(&mut store, A, topic, 0, 0.8);
        opinion(&mut store, B, topic, 0, 0.2);
        store.add_follow(FollowEvent::follow(READER, A, 0)).unwrap();
        store.add_follow(FollowEvent::follow(READER, B, 0)).unwrap();

        let score = friedkin_johnsen(&store, READER, topic, 0.5, false).unwrap();
        assert_close(score, 0.5);
    }

    #[test]
    fn test_friedkin_johnsen_anchor_choice() {
        let (mut store, topic) = store();
        opinion(&mut store, READER, topic, 0, 0.0);
        opinion(&mut store, READER, topic, 1, 0.4);
        opinion(&mut store, A, topic, 1, 1.0);
        store.add_follow(FollowEvent::follow(READER, A, 0)).unwrap();

        let independent = friedkin_johnsen(&store, READER, topic, 0.5, false).unwrap();
        let dependent = friedkin_johnsen(&store, READER, topic, 0.5, true).unwrap();

        assert_close(independent, 0.5);
        assert_close(dependent, 0.7);
    }

    #[test]
    fn test_friedkin_johnsen_without_peers_keeps_current() {
        let (mut store, topic) = store();
        opinion(&mut store, READER, topic, 0, 0.1);
        opinion(&mut store, READER, topic, 1, 0.6);

        for lambda in [0.0, 0.3, 1.0] {
            let score = friedkin_johnsen(&store, READER, topic, lambda, false).unwrap();
            assert_close(score, 0.6);
        }
    }

    #[test]
    fn test_friedkin_johnsen_ignores_unfollowed_and_silent_peers() {
        let (mut store, topic) = store();
        opinion(&mut store, READER, topic, 0, 0.5);
        opinion(&mut store, A, topic, 0, 1.0);
        opinion(&mut store, B, topic, 0, 0.0);
        store.add_follow(FollowEvent::follow(READER, A, 0)).unwrap();
        store.add_follow(FollowEvent::follow(READER, B, 0)).unwrap();
        store.add_follow(FollowEvent::follow(READER, C, 0)).unwrap();
        store.add_round(2);
        store.add_follow(FollowEvent::unfollow(READER, B, 2)).unwrap();

        // B unfollowed, C has no opinion: only A counts
        let score = friedkin_johnsen(&store, READER, topic, 1.0, false).unwrap();
        assert_close(score, 1.0);
    }

    #[test]
    fn test_friedkin_johnsen_requires_history() {
        let (store, topic) = store();
        assert_eq!(
            friedkin_johnsen(&store, READER, topic, 0.5, true),
            Err(EngineError::MissingOpinion {
                user: READER,
                topic
            })
        );
    }

    #[test]
    fn test_friedkin_johnsen_is_monotone_in_susceptibility() {
        let (mut store, topic) = store();
        opinion(&mut store, READER, topic, 0, 0.1);
        opinion(&mut store, A, topic, 0, 0.9);
        store.add_follow(FollowEvent::follow(READER, A, 0)).unwrap();

        let scores: Vec<f64> = (0..=10)
            .map(|i| friedkin_johnsen(&store, READER, topic, i as f64 / 10.0, false).unwrap())
            .collect();
        assert!(scores.windows(2).all(|pair| pair[1] >= pair[0]));
        assert_close(scores[0], 0.1);
        assert_close(scores[10], 0.9);
    }

    #[test]
    fn test_weighted_fj_without_weight_returns_anchor() {
        let (mut store, topic) = store();
        opinion(&mut store, READER, topic, 0, 0.3);

        let weights = InfluenceWeights::default();
        for lambda in [0.0, 0.5, 1.0] {
            assert_close(
                weighted_friedkin_johnsen(&store, &weights, 0.5, READER, topic, lambda),
                0.3,
            );
        }
    }

    #[test]
    fn test_weighted_fj_neutral_anchor_for_new_user() {
        let (store, topic) = store();
        let weights = InfluenceWeights::default();
        assert_close(
            weighted_friedkin_johnsen(&store, &weights, 0.5, READER, topic, 0.7),
            0.5,
        );
    }

    #[test]
    fn test_weighted_fj_blends_follow_and_reaction_weights() {
        let (mut store, topic) = store();
        opinion(&mut store, READER, topic, 0, 0.0);
        opinion(&mut store, A, topic, 0, 1.0);
        opinion(&mut store, B, topic, 0, 0.5);
        store.add_follow(FollowEvent::follow(READER, A, 0)).unwrap();
        let post = store
            .publish(&SeedPost {
                author: B,
                round: 1,
                topics: vec!["climate".into()],
                ..SeedPost::default()
            })
            .unwrap();
        store.add_round(1);
        store
            .add_reaction(ReactionEvent::new(post, READER, ReactionKind::Like, 1))
            .unwrap();

        // weights: A 1.0, B 0.2 -> peer mean (1.0 + 0.1) / 1.2
        let expected = 0.5 * 0.0 + 0.5 * (1.1 / 1.2);
        let weights = InfluenceWeights::default();
        assert_close(
            weighted_friedkin_johnsen(&store, &weights, 0.5, READER, topic, 0.5),
            expected,
        );
    }

    #[test]
    fn test_weighted_fj_silent_neighbor_still_counts_in_total() {
        let (mut store, topic) = store();
        opinion(&mut store, READER, topic, 0, 0.0);
        opinion(&mut store, A, topic, 0, 0.8);
        store.add_follow(FollowEvent::follow(READER, A, 0)).unwrap();
        store.add_follow(FollowEvent::follow(READER, B, 0)).unwrap();

        // B has no opinion: weight 2.0 in total, 0.8 in the weighted sum.
        let weights = InfluenceWeights::default();
        assert_close(
            weighted_friedkin_johnsen(&store, &weights, 0.5, READER, topic, 1.0),
            0.4,
        );
    }

    #[test]
    fn test_weighted_fj_ignores_reactions_before_latest_opinion() {
        let (mut store, topic) = store();
        opinion(&mut store, B, topic, 0, 1.0);
        let post = store
            .publish(&SeedPost {
                author: B,
                round: 1,
                topics: vec!["climate".into()],
                ..SeedPost::default()
            })
            .unwrap();
        store
            .add_reaction(ReactionEvent::new(post, READER, ReactionKind::Like, 1))
            .unwrap();
        opinion(&mut store, READER, topic, 2, 0.2);

        let weights = InfluenceWeights::default();
        assert_close(
            weighted_friedkin_johnsen(&store, &weights, 0.5, READER, topic, 1.0),
            0.2,
        );
    }
}
