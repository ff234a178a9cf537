//! Persistence seam.
//!
//! The engine only reads users, topics, posts, follow events, reactions,
//! opinion history and rounds, and only appends opinion records, audit rows
//! and mention delivery flags. [`SocialStore`] is exactly that surface;
//! [`MemoryStore`] is the in-process implementation used by the simulation
//! driver and the tests.

mod memory;

pub use memory::{MemoryStore, ReactionOutcome};

use feed_events::{
    FollowEvent, Mention, MentionId, OpinionRecord, Post, PostId, ReactionEvent,
    RecommendationAudit, RoundId, Topic, TopicId, User, UserId,
};

/// Read/append access to the simulation log.
pub trait SocialStore {
    /// Largest recorded round id, if any round exists.
    fn latest_round(&self) -> Option<RoundId>;

    fn user(&self, id: UserId) -> Option<&User>;

    /// Page accounts whose leaning equals `leaning`.
    fn pages_with_leaning(&self, leaning: &str) -> Vec<UserId>;

    fn topic_by_name(&self, name: &str) -> Option<&Topic>;

    fn post(&self, id: PostId) -> Option<&Post>;

    /// Posts with `round >= floor`, in ascending id order.
    fn posts_since(&self, floor: RoundId) -> Vec<&Post>;

    /// Number of reactions of any kind on `post`.
    fn reaction_count(&self, post: PostId) -> usize;

    /// Follow events from `actor` to `target`, ordered by ascending round.
    fn follow_events(&self, actor: UserId, target: UserId) -> &[FollowEvent];

    /// Every user `actor` has ever issued a follow event towards.
    fn addressed_users(&self, actor: UserId) -> Vec<UserId>;

    /// Reactions made by `user`, in insertion order.
    fn reactions_by(&self, user: UserId) -> Vec<&ReactionEvent>;

    /// Opinion log for one (user, topic) pair, in insertion order.
    fn opinion_history(&self, user: UserId, topic: TopicId) -> &[OpinionRecord];

    /// Every opinion record of `user`, across topics.
    fn opinions_of(&self, user: UserId) -> Vec<&OpinionRecord>;

    fn append_opinion(&mut self, record: OpinionRecord);

    /// Unanswered mentions of `user` with `round >= floor`.
    fn open_mentions(&self, user: UserId, floor: RoundId) -> Vec<&Mention>;

    /// Flags a mention as delivered. Returns `None` if it does not exist.
    fn mark_mention_answered(&mut self, id: MentionId) -> Option<&Mention>;

    fn append_audit(&mut self, audit: RecommendationAudit);
}
