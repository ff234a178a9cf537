//! Recommendation Audit Records
//!
//! One row per feed request, written once and never read back by the engine.

use serde::{Deserialize, Serialize};

use crate::content::PostId;
use crate::round::RoundId;
use crate::social::UserId;

/// The ordered post ids shown to `reader` in `round`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationAudit {
    pub reader: UserId,
    pub round: RoundId,
    pub post_ids: Vec<PostId>,
}

impl RecommendationAudit {
    pub fn new(reader: UserId, round: RoundId, post_ids: Vec<PostId>) -> Self {
        Self {
            reader,
            round,
            post_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_audit_serializes() {
        let audit = RecommendationAudit::new(1, 5, vec![]);
        assert_eq!(
            serde_json::to_string(&audit).unwrap(),
            r#"{"reader":1,"round":5,"post_ids":[]}"#
        );
    }
}
