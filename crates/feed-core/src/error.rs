//! Engine error taxonomy.
//!
//! Every failure is scoped to a single request; none of these are fatal to
//! the process and none are retried by the engine.

use feed_events::{PostId, TopicId, UserId};
use thiserror::Error;

/// Errors returned by engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("topic '{0}' not found")]
    TopicNotFound(String),

    #[error("post {0} not found")]
    PostNotFound(PostId),

    /// A model that needs an anchor opinion found no history for the pair.
    #[error("user {user} has no opinion on topic {topic}")]
    MissingOpinion { user: UserId, topic: TopicId },

    /// No round has been recorded yet, so there is no current round.
    #[error("simulation clock has not started: no rounds recorded")]
    ClockNotStarted,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl EngineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidRequest(message.into())
    }

    /// True for the not-found family, which callers report distinctly from
    /// an empty result.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::UserNotFound(_)
                | EngineError::TopicNotFound(_)
                | EngineError::PostNotFound(_)
                | EngineError::MissingOpinion { .. }
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
