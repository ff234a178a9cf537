//! Round Types
//!
//! A round is one discrete simulation step. Round ids only ever grow; the
//! current round is the largest id recorded so far.
//!
//! # Example
//!
//! ```
//! use feed_events::visibility_floor;
//!
//! assert_eq!(visibility_floor(10, 3), 7);
//! assert_eq!(visibility_floor(2, 5), 0);
//! ```

/// Identifier of a simulation round.
pub type RoundId = u64;

/// Oldest round still visible when looking back `window` rounds from `current`.
///
/// Saturates at round 0 rather than going negative.
pub fn visibility_floor(current: RoundId, window: u64) -> RoundId {
    current.saturating_sub(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_floor() {
        assert_eq!(visibility_floor(24, 0), 24);
        assert_eq!(visibility_floor(24, 24), 0);
        assert_eq!(visibility_floor(24, 100), 0);
    }
}
