//! Feed Selection Engine
//!
//! Picks the posts a reader sees when reading the timeline, searching by
//! hashtag, or checking mentions. Every timeline read leaves one
//! recommendation audit row behind.

mod mentions;
mod mode;
mod search;

pub use mentions::read_mentions;
pub use mode::FeedMode;
pub use search::search;

use std::cmp::Reverse;
use std::collections::HashSet;

use feed_events::{visibility_floor, PostId, RecommendationAudit, RoundId, UserId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::current_round;
use crate::config::FeedConfig;
use crate::error::{EngineError, EngineResult};
use crate::graph::followees;
use crate::store::SocialStore;

/// A timeline read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedRequest {
    pub reader: UserId,
    #[serde(default)]
    pub mode: FeedMode,
    /// Falls back to the configured default limit
    #[serde(default)]
    pub limit: Option<usize>,
    /// Trailing rounds eligible for retrieval
    pub visibility_rounds: u64,
    /// Share of the feed reserved for followees; defaults from configuration
    #[serde(default)]
    pub follower_ratio: Option<f64>,
    /// Restrict candidates to articles from pages sharing the reader's leaning
    #[serde(default)]
    pub article: bool,
}

impl FeedRequest {
    pub fn new(reader: UserId, mode: FeedMode, limit: usize, visibility_rounds: u64) -> Self {
        Self {
            reader,
            mode,
            limit: Some(limit),
            visibility_rounds,
            follower_ratio: None,
            article: false,
        }
    }

    pub fn with_follower_ratio(mut self, ratio: f64) -> Self {
        self.follower_ratio = Some(ratio);
        self
    }

    pub fn articles(mut self) -> Self {
        self.article = true;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if let Some(ratio) = self.follower_ratio {
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(EngineError::invalid(format!(
                    "follower ratio must be a non-negative number, got {ratio}"
                )));
            }
        }
        Ok(())
    }
}

/// Splits `limit` into (followee quota, general remainder).
pub fn follower_split(limit: usize, ratio: f64) -> (usize, usize) {
    if ratio >= 1.0 {
        return (limit, 0);
    }
    let quota = (limit as f64 * ratio).floor() as usize;
    (quota, limit - quota)
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: PostId,
    author: UserId,
    round: RoundId,
    reactions: usize,
}

fn by_recency(candidates: &mut [Candidate]) {
    candidates.sort_by_key(|c| Reverse((c.round, c.id)));
}

fn by_popularity(candidates: &mut [Candidate]) {
    candidates.sort_by_key(|c| Reverse((c.reactions, c.id)));
}

fn take_ids<'a>(
    candidates: impl IntoIterator<Item = &'a Candidate>,
    limit: usize,
) -> Vec<PostId> {
    candidates.into_iter().take(limit).map(|c| c.id).collect()
}

/// Eligible posts for `reader` inside the visibility window.
fn eligible_candidates<S: SocialStore + ?Sized>(
    store: &S,
    reader: UserId,
    floor: RoundId,
    articles_only: bool,
) -> EngineResult<Vec<Candidate>> {
    let reader_user = store.user(reader).ok_or(EngineError::UserNotFound(reader))?;
    let pages: HashSet<UserId> = if articles_only {
        reader_user
            .leaning
            .as_deref()
            .map(|leaning| store.pages_with_leaning(leaning).into_iter().collect())
            .unwrap_or_default()
    } else {
        HashSet::new()
    };

    Ok(store
        .posts_since(floor)
        .into_iter()
        .filter(|post| {
            if articles_only {
                post.is_article() && pages.contains(&post.author)
            } else {
                post.author != reader
            }
        })
        .map(|post| Candidate {
            id: post.id,
            author: post.author,
            round: post.round,
            reactions: store.reaction_count(post.id),
        })
        .collect())
}

/// Fills the followee quota with `rank_followees`, then the remainder from
/// everyone else by recency.
fn follower_batches<S: SocialStore + ?Sized>(
    store: &S,
    reader: UserId,
    now: RoundId,
    mut candidates: Vec<Candidate>,
    limit: usize,
    ratio: f64,
    rank_followees: fn(&mut [Candidate]),
) -> Vec<Vec<PostId>> {
    let (quota, remainder) = follower_split(limit, ratio);
    let following: HashSet<UserId> = followees(store, reader, now).into_iter().collect();

    let mut from_followees: Vec<Candidate> = candidates
        .iter()
        .filter(|c| following.contains(&c.author))
        .copied()
        .collect();
    rank_followees(&mut from_followees);
    let first = take_ids(&from_followees, quota);

    let mut batches = vec![first];
    if remainder > 0 {
        let taken: HashSet<PostId> = batches[0].iter().copied().collect();
        by_recency(&mut candidates);
        batches.push(take_ids(
            candidates.iter().filter(|c| !taken.contains(&c.id)),
            remainder,
        ));
    }
    batches
}

/// Selects the feed for a reader and records the exposure.
///
/// The result never exceeds the limit, never contains duplicates, and only
/// contains posts that still exist. The audit row is written exactly once,
/// even when nothing is selected.
pub fn select_feed<S, R>(
    store: &mut S,
    rng: &mut R,
    config: &FeedConfig,
    request: &FeedRequest,
) -> EngineResult<Vec<PostId>>
where
    S: SocialStore + ?Sized,
    R: Rng + ?Sized,
{
    request.validate()?;
    let now = current_round(&*store)?;
    let floor = visibility_floor(now, request.visibility_rounds);
    let limit = request.limit.unwrap_or(config.default_limit);
    let ratio = request
        .follower_ratio
        .unwrap_or(config.default_follower_ratio);

    let mut candidates = eligible_candidates(&*store, request.reader, floor, request.article)?;
    debug!(
        reader = request.reader,
        mode = %request.mode,
        candidates = candidates.len(),
        floor,
        "selecting feed"
    );

    let batches = match request.mode {
        FeedMode::Rchrono => {
            by_recency(&mut candidates);
            vec![take_ids(&candidates, limit)]
        }
        FeedMode::RchronoPopularity => {
            by_popularity(&mut candidates);
            vec![take_ids(&candidates, limit)]
        }
        FeedMode::RchronoFollowers => follower_batches(
            &*store,
            request.reader,
            now,
            candidates,
            limit,
            ratio,
            by_recency,
        ),
        FeedMode::RchronoFollowersPopularity => follower_batches(
            &*store,
            request.reader,
            now,
            candidates,
            limit,
            ratio,
            by_popularity,
        ),
        FeedMode::Random => {
            let mut ids: Vec<PostId> = candidates.iter().map(|c| c.id).collect();
            ids.shuffle(rng);
            ids.truncate(limit);
            vec![ids]
        }
    };

    let mut seen = HashSet::new();
    let mut post_ids = Vec::new();
    for id in batches.into_iter().flatten() {
        if store.post(id).is_none() {
            warn!(post = id, "dropping recommended post that no longer exists");
            continue;
        }
        if seen.insert(id) {
            post_ids.push(id);
        }
    }

    store.append_audit(RecommendationAudit::new(request.reader, now, post_ids.clone()));
    info!(
        reader = request.reader,
        mode = %request.mode,
        round = now,
        posts = post_ids.len(),
        "feed served"
    );
    Ok(post_ids)
}
