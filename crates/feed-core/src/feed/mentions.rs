//! Mention delivery.

use feed_events::{PostId, UserId};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::clock::visible_since;
use crate::error::{EngineError, EngineResult};
use crate::store::SocialStore;

/// Delivers one unanswered mention of `reader` from the visibility window,
/// chosen uniformly at random, and marks it answered so it is never
/// delivered again. `Ok(None)` means nothing is pending.
pub fn read_mentions<S, R>(
    store: &mut S,
    rng: &mut R,
    reader: UserId,
    visibility_rounds: u64,
) -> EngineResult<Option<PostId>>
where
    S: SocialStore + ?Sized,
    R: Rng + ?Sized,
{
    if store.user(reader).is_none() {
        return Err(EngineError::UserNotFound(reader));
    }
    let floor = visible_since(&*store, visibility_rounds)?;

    let open: Vec<_> = store
        .open_mentions(reader, floor)
        .into_iter()
        .map(|mention| mention.id)
        .collect();
    let Some(&chosen) = open.choose(rng) else {
        debug!(reader, "no pending mentions");
        return Ok(None);
    };

    let post = store.mark_mention_answered(chosen).map(|mention| mention.post);
    debug!(reader, mention = chosen, ?post, "mention delivered");
    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use feed_events::{SeedPost, User};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.add_round(10);
        store.add_user(User::new(1, "reader")).unwrap();
        store.add_user(User::new(2, "other")).unwrap();
        store
    }

    fn mention_reader(store: &mut MemoryStore, round: u64) -> PostId {
        store
            .publish(&SeedPost {
                author: 2,
                round,
                mentions: vec!["@reader".into()],
                ..SeedPost::default()
            })
            .unwrap()
    }

    #[test]
    fn test_each_mention_delivered_once() {
        let mut store = store();
        let first = mention_reader(&mut store, 9);
        let second = mention_reader(&mut store, 10);
        let mut rng = SmallRng::seed_from_u64(5);

        let mut delivered = vec![
            read_mentions(&mut store, &mut rng, 1, 3).unwrap().unwrap(),
            read_mentions(&mut store, &mut rng, 1, 3).unwrap().unwrap(),
        ];
        delivered.sort_unstable();

        assert_eq!(delivered, vec![first, second]);
        assert_eq!(read_mentions(&mut store, &mut rng, 1, 3), Ok(None));
    }

    #[test]
    fn test_mentions_outside_window_are_skipped() {
        let mut store = store();
        mention_reader(&mut store, 2);
        let mut rng = SmallRng::seed_from_u64(5);

        assert_eq!(read_mentions(&mut store, &mut rng, 1, 3), Ok(None));
        assert!(read_mentions(&mut store, &mut rng, 1, 10).unwrap().is_some());
    }

    #[test]
    fn test_unknown_reader_is_not_found() {
        let mut store = store();
        let mut rng = SmallRng::seed_from_u64(5);
        assert_eq!(
            read_mentions(&mut store, &mut rng, 7, 3),
            Err(EngineError::UserNotFound(7))
        );
    }
}
