//! Hashtag search.

use std::cmp::Reverse;
use std::collections::HashSet;

use feed_events::{PostId, UserId};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::clock::visible_since;
use crate::config::FeedConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::SocialStore;

/// Posts by others that share a hashtag with the reader's recent posts.
///
/// Looks at the reader's posts inside the visibility window, newest first,
/// and keeps up to `search_hashtag_limit` distinct hashtags. Returns up to
/// `search_result_limit` matching posts by other users from the same window,
/// in random order. `Ok(None)` means the reader used no hashtags recently.
pub fn search<S, R>(
    store: &S,
    rng: &mut R,
    config: &FeedConfig,
    reader: UserId,
    visibility_rounds: u64,
) -> EngineResult<Option<Vec<PostId>>>
where
    S: SocialStore + ?Sized,
    R: Rng + ?Sized,
{
    if store.user(reader).is_none() {
        return Err(EngineError::UserNotFound(reader));
    }
    let floor = visible_since(store, visibility_rounds)?;
    let window = store.posts_since(floor);

    let mut own_posts: Vec<_> = window.iter().filter(|p| p.author == reader).collect();
    own_posts.sort_by_key(|p| Reverse((p.round, p.id)));

    let mut hashtags: Vec<&str> = Vec::new();
    for tag in own_posts.iter().flat_map(|p| p.hashtags.iter()) {
        if hashtags.len() == config.search_hashtag_limit {
            break;
        }
        if !hashtags.contains(&tag.as_str()) {
            hashtags.push(tag);
        }
    }
    if hashtags.is_empty() {
        debug!(reader, "no recent hashtags to search with");
        return Ok(None);
    }

    let wanted: HashSet<&str> = hashtags.into_iter().collect();
    let mut matches: Vec<PostId> = window
        .iter()
        .filter(|p| p.author != reader && p.hashtags.iter().any(|t| wanted.contains(t.as_str())))
        .map(|p| p.id)
        .collect();
    matches.shuffle(rng);
    matches.truncate(config.search_result_limit);

    debug!(reader, tags = wanted.len(), results = matches.len(), "search served");
    Ok(Some(matches))
}
