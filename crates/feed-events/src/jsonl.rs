//! JSON Lines encoding for log records.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{OpinionRecord, RecommendationAudit};

/// A record that is written to and read from JSONL logs, one per line.
pub trait JsonlRecord: Serialize + DeserializeOwned {
    /// Serializes the record to a single JSON line.
    fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a record from a JSON line.
    fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

impl JsonlRecord for OpinionRecord {}
impl JsonlRecord for RecommendationAudit {}
