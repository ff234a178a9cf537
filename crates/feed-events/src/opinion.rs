//! Opinion Records
//!
//! The opinion log is append-only: every update adds a row, nothing is
//! rewritten. The latest row for a (user, topic) pair is its current opinion;
//! the round-0 row, when present, is the initial opinion.

use serde::{Deserialize, Serialize};

use crate::content::TopicId;
use crate::round::RoundId;
use crate::social::UserId;

/// One opinion state for a user on a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionRecord {
    pub user: UserId,
    pub topic: TopicId,
    pub round: RoundId,
    pub score: f64,
    /// Score as judged by the agent's language model, kept beside the model output
    pub score_llm: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl OpinionRecord {
    pub fn new(user: UserId, topic: TopicId, round: RoundId, score: f64) -> Self {
        Self {
            user,
            topic,
            round,
            score,
            score_llm: score,
            description: None,
        }
    }

    pub fn with_llm_score(mut self, score_llm: f64) -> Self {
        self.score_llm = score_llm;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Rounds a score to `precision` decimal places for persistence.
pub fn round_score(score: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (score * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123456, 3), 0.123);
        assert_eq!(round_score(0.6666, 3), 0.667);
        assert_eq!(round_score(-0.3335, 2), -0.33);
        assert_eq!(round_score(0.5, 0), 1.0);
    }

    #[test]
    fn test_record_builder() {
        let record = OpinionRecord::new(1, 2, 0, 0.4)
            .with_llm_score(0.6)
            .with_description("cautiously supportive");

        assert_eq!(record.score, 0.4);
        assert_eq!(record.score_llm, 0.6);
        assert_eq!(record.description.as_deref(), Some("cautiously supportive"));
    }
}
