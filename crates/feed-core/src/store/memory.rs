//! In-memory store.
//!
//! Keeps every log append-only and indexed the way the engine reads it: follow
//! events per (actor, target) pair sorted by round, posts by round, reactions
//! by user, opinions per (user, topic).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use feed_events::{
    Dataset, FollowEvent, Mention, MentionId, OpinionRecord, Post, PostId, ReactionEvent,
    RecommendationAudit, RoundId, SeedPost, Topic, TopicId, User, UserId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::SocialStore;
use crate::error::{EngineError, EngineResult};

/// Root-post hashtags shorter than this are dropped.
const MIN_ROOT_HASHTAG_LEN: usize = 4;

/// Result of inserting a reaction. Duplicates are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionOutcome {
    Inserted,
    Duplicate,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    rounds: BTreeSet<RoundId>,
    users: BTreeMap<UserId, User>,
    usernames: HashMap<String, UserId>,
    topics: BTreeMap<TopicId, Topic>,
    topic_names: HashMap<String, TopicId>,
    posts: BTreeMap<PostId, Post>,
    posts_by_round: BTreeMap<RoundId, BTreeSet<PostId>>,
    last_post_id: PostId,
    follows: HashMap<(UserId, UserId), Vec<FollowEvent>>,
    addressed: HashMap<UserId, BTreeSet<UserId>>,
    reactions: Vec<ReactionEvent>,
    reactions_by_user: HashMap<UserId, Vec<usize>>,
    reaction_keys: HashSet<(PostId, UserId)>,
    reaction_counts: HashMap<PostId, usize>,
    opinions: HashMap<(UserId, TopicId), Vec<OpinionRecord>>,
    mentions: Vec<Mention>,
    audits: Vec<RecommendationAudit>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store by replaying a dataset snapshot.
    pub fn from_dataset(dataset: &Dataset) -> EngineResult<Self> {
        let mut store = Self::new();
        for &round in &dataset.rounds {
            store.add_round(round);
        }
        for user in &dataset.users {
            store.add_user(user.clone())?;
        }
        for name in &dataset.topics {
            store.ensure_topic(name);
        }
        for seed in &dataset.posts {
            store.publish(seed)?;
        }
        for event in &dataset.follows {
            store.add_follow(event.clone())?;
        }
        for reaction in &dataset.reactions {
            store.add_reaction(reaction.clone())?;
        }
        for record in &dataset.opinions {
            store.seed_opinion(record.clone())?;
        }
        debug!(
            users = store.users.len(),
            posts = store.posts.len(),
            reactions = store.reactions.len(),
            "loaded dataset"
        );
        Ok(store)
    }

    pub fn add_round(&mut self, round: RoundId) {
        self.rounds.insert(round);
    }

    /// Opens the round after the current one (round 0 on an empty store).
    pub fn advance_round(&mut self) -> RoundId {
        let next = self.rounds.last().map_or(0, |r| r + 1);
        self.rounds.insert(next);
        next
    }

    pub fn add_user(&mut self, user: User) -> EngineResult<()> {
        if self.users.contains_key(&user.id) {
            return Err(EngineError::invalid(format!("user {} already exists", user.id)));
        }
        if self.usernames.contains_key(&user.username) {
            return Err(EngineError::invalid(format!(
                "username '{}' already taken",
                user.username
            )));
        }
        self.usernames.insert(user.username.clone(), user.id);
        self.users.insert(user.id, user);
        Ok(())
    }

    /// Returns the id of the named topic, creating it if needed.
    pub fn ensure_topic(&mut self, name: &str) -> TopicId {
        if let Some(&id) = self.topic_names.get(name) {
            return id;
        }
        let id = self.topics.keys().next_back().map_or(1, |last| last + 1);
        self.topics.insert(id, Topic::new(id, name));
        self.topic_names.insert(name.to_string(), id);
        id
    }

    /// Publishes a root post, or a comment when `seed.comment_to` is set.
    pub fn publish(&mut self, seed: &SeedPost) -> EngineResult<PostId> {
        if !self.users.contains_key(&seed.author) {
            return Err(EngineError::UserNotFound(seed.author));
        }

        let id = self.last_post_id + 1;
        let mut post = match seed.comment_to {
            None => {
                let topic_ids = seed.topics.iter().map(|name| self.ensure_topic(name)).collect();
                let hashtags = seed
                    .hashtags
                    .iter()
                    .filter(|tag| tag.chars().count() >= MIN_ROOT_HASHTAG_LEN)
                    .cloned()
                    .collect();
                let mut post = Post::root(id, seed.author, seed.round)
                    .with_topics(topic_ids)
                    .with_hashtags(hashtags);
                post.article_id = seed.article_id;
                post
            }
            Some(parent_id) => {
                let parent = self
                    .posts
                    .get(&parent_id)
                    .ok_or(EngineError::PostNotFound(parent_id))?;
                // Comments are about whatever their thread root is about.
                let topic_ids = self
                    .posts
                    .get(&parent.thread_id)
                    .map(|root| root.topic_ids.clone())
                    .unwrap_or_default();
                Post {
                    id,
                    author: seed.author,
                    thread_id: parent.thread_id,
                    comment_to: Some(parent_id),
                    round: seed.round,
                    text: String::new(),
                    topic_ids,
                    hashtags: seed.hashtags.iter().filter(|t| !t.is_empty()).cloned().collect(),
                    article_id: None,
                }
            }
        };
        post.text = seed.text.clone();

        self.last_post_id = id;
        self.posts_by_round.entry(post.round).or_default().insert(id);
        self.posts.insert(id, post);

        for name in &seed.mentions {
            let username = name.trim_start_matches('@');
            match self.usernames.get(username).copied() {
                Some(user) if user != seed.author => {
                    let mention_id = self.mentions.len() as MentionId + 1;
                    self.mentions.push(Mention {
                        id: mention_id,
                        user,
                        post: id,
                        round: seed.round,
                        answered: false,
                    });
                }
                Some(_) => {}
                None => debug!(post = id, username, "ignoring mention of unknown user"),
            }
        }

        Ok(id)
    }

    /// Removes a post. Reactions and mentions pointing at it are left in place.
    pub fn delete_post(&mut self, id: PostId) -> bool {
        match self.posts.remove(&id) {
            Some(post) => {
                if let Some(ids) = self.posts_by_round.get_mut(&post.round) {
                    ids.remove(&id);
                }
                true
            }
            None => false,
        }
    }

    /// Appends a follow event. Events for a pair stay sorted by round; an
    /// event sharing a round with an earlier one sorts after it.
    pub fn add_follow(&mut self, event: FollowEvent) -> EngineResult<()> {
        for user in [event.actor, event.target] {
            if !self.users.contains_key(&user) {
                return Err(EngineError::UserNotFound(user));
            }
        }
        self.addressed
            .entry(event.actor)
            .or_default()
            .insert(event.target);
        let events = self.follows.entry((event.actor, event.target)).or_default();
        let at = events.partition_point(|e| e.round <= event.round);
        events.insert(at, event);
        Ok(())
    }

    /// Inserts a reaction unless the user already reacted to the post.
    pub fn add_reaction(&mut self, reaction: ReactionEvent) -> EngineResult<ReactionOutcome> {
        if !self.users.contains_key(&reaction.user) {
            return Err(EngineError::UserNotFound(reaction.user));
        }
        if !self.posts.contains_key(&reaction.post) {
            return Err(EngineError::PostNotFound(reaction.post));
        }
        if !self.reaction_keys.insert((reaction.post, reaction.user)) {
            warn!(
                post = reaction.post,
                user = reaction.user,
                "duplicate reaction discarded"
            );
            return Ok(ReactionOutcome::Duplicate);
        }

        *self.reaction_counts.entry(reaction.post).or_default() += 1;
        self.reactions_by_user
            .entry(reaction.user)
            .or_default()
            .push(self.reactions.len());
        self.reactions.push(reaction);
        Ok(ReactionOutcome::Inserted)
    }

    /// Appends an opinion record after checking that user and topic exist.
    pub fn seed_opinion(&mut self, record: OpinionRecord) -> EngineResult<()> {
        if !self.users.contains_key(&record.user) {
            return Err(EngineError::UserNotFound(record.user));
        }
        if !self.topics.contains_key(&record.topic) {
            return Err(EngineError::TopicNotFound(record.topic.to_string()));
        }
        self.append_opinion(record);
        Ok(())
    }

    pub fn audits(&self) -> &[RecommendationAudit] {
        &self.audits
    }

    pub fn mentions(&self) -> &[Mention] {
        &self.mentions
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }
}

impl SocialStore for MemoryStore {
    fn latest_round(&self) -> Option<RoundId> {
        self.rounds.last().copied()
    }

    fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    fn pages_with_leaning(&self, leaning: &str) -> Vec<UserId> {
        self.users
            .values()
            .filter(|u| u.is_page && u.leaning.as_deref() == Some(leaning))
            .map(|u| u.id)
            .collect()
    }

    fn topic_by_name(&self, name: &str) -> Option<&Topic> {
        self.topic_names
            .get(name)
            .and_then(|id| self.topics.get(id))
    }

    fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.get(&id)
    }

    fn posts_since(&self, floor: RoundId) -> Vec<&Post> {
        let mut ids: Vec<PostId> = self
            .posts_by_round
            .range(floor..)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        ids.sort_unstable();
        ids.iter().filter_map(|id| self.posts.get(id)).collect()
    }

    fn reaction_count(&self, post: PostId) -> usize {
        self.reaction_counts.get(&post).copied().unwrap_or(0)
    }

    fn follow_events(&self, actor: UserId, target: UserId) -> &[FollowEvent] {
        self.follows
            .get(&(actor, target))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn addressed_users(&self, actor: UserId) -> Vec<UserId> {
        self.addressed
            .get(&actor)
            .map(|targets| targets.iter().copied().collect())
            .unwrap_or_default()
    }

    fn reactions_by(&self, user: UserId) -> Vec<&ReactionEvent> {
        self.reactions_by_user
            .get(&user)
            .map(|idx| idx.iter().map(|&i| &self.reactions[i]).collect())
            .unwrap_or_default()
    }

    fn opinion_history(&self, user: UserId, topic: TopicId) -> &[OpinionRecord] {
        self.opinions
            .get(&(user, topic))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn opinions_of(&self, user: UserId) -> Vec<&OpinionRecord> {
        self.opinions
            .iter()
            .filter(|((u, _), _)| *u == user)
            .flat_map(|(_, records)| records.iter())
            .collect()
    }

    fn append_opinion(&mut self, record: OpinionRecord) {
        self.opinions
            .entry((record.user, record.topic))
            .or_default()
            .push(record);
    }

    fn open_mentions(&self, user: UserId, floor: RoundId) -> Vec<&Mention> {
        self.mentions
            .iter()
            .filter(|m| m.user == user && m.round >= floor && !m.answered)
            .collect()
    }

    fn mark_mention_answered(&mut self, id: MentionId) -> Option<&Mention> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        let mention = self.mentions.get_mut(index)?;
        mention.answered = true;
        Some(&*mention)
    }

    fn append_audit(&mut self, audit: RecommendationAudit) {
        self.audits.push(audit);
    }
}
