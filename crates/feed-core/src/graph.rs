//! Social Graph View
//!
//! The follow relation is event-sourced: for each (follower, followee) pair
//! the latest event at or before the requested round decides.

use feed_events::{FollowAction, RoundId, UserId};

use crate::store::SocialStore;

/// True iff the latest follow event from `follower` to `followee` with
/// `round <= as_of` is a follow. No events means not following.
///
/// Cost is linear in the events for that pair only.
pub fn is_following<S: SocialStore + ?Sized>(
    store: &S,
    follower: UserId,
    followee: UserId,
    as_of: RoundId,
) -> bool {
    store
        .follow_events(follower, followee)
        .iter()
        .rev()
        .find(|event| event.round <= as_of)
        .map_or(false, |event| event.action == FollowAction::Follow)
}

/// Users `user` follows as of `as_of`, in ascending id order.
pub fn followees<S: SocialStore + ?Sized>(store: &S, user: UserId, as_of: RoundId) -> Vec<UserId> {
    store
        .addressed_users(user)
        .into_iter()
        .filter(|&target| is_following(store, user, target, as_of))
        .collect()
}
