//! Round Clock
//!
//! The current round is the largest round id in the store. Everything that
//! looks back over a window counts from it.

use feed_events::{visibility_floor, RoundId};

use crate::error::{EngineError, EngineResult};
use crate::store::SocialStore;

/// Current simulation round.
pub fn current_round<S: SocialStore + ?Sized>(store: &S) -> EngineResult<RoundId> {
    store.latest_round().ok_or(EngineError::ClockNotStarted)
}

/// Oldest round visible from the current round with a trailing `window`.
pub fn visible_since<S: SocialStore + ?Sized>(store: &S, window: u64) -> EngineResult<RoundId> {
    Ok(visibility_floor(current_round(store)?, window))
}

/// Round at which "current" relations are evaluated. Before the clock starts
/// every recorded event counts.
pub fn observation_round<S: SocialStore + ?Sized>(store: &S) -> RoundId {
    store.latest_round().unwrap_or(RoundId::MAX)
}
