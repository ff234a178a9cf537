//! Opinion Dynamics Engine
//!
//! Four interchangeable update models over the append-only opinion log. The
//! models are pure: they read the store and return a score. Persisting the
//! result is the job of [`update_opinion`].

mod models;
mod update;

pub use models::{friedkin_johnsen, median, weighted_friedkin_johnsen, weighted_mean};
pub use update::{
    get_opinions, init_opinions, last_opinion_round, update_opinion, CoalitionStance,
    OpinionUpdate, OpinionView,
};

use std::fmt;

use feed_events::{OpinionRecord, TopicId, UserId};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::SocialStore;

/// Model names accepted by requests and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpinionMethod {
    WeightedMean,
    Median,
    FriedkinJohnsen,
    StateDependentFj,
    WeightedFriedkinJohnsen,
}

impl OpinionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpinionMethod::WeightedMean => "weighted_mean",
            OpinionMethod::Median => "median",
            OpinionMethod::FriedkinJohnsen => "friedkin_johnsen",
            OpinionMethod::StateDependentFj => "state_dependent_fj",
            OpinionMethod::WeightedFriedkinJohnsen => "weighted_friedkin_johnsen",
        }
    }
}

impl fmt::Display for OpinionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selected model together with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpinionModel {
    WeightedMean { decay_factor: f64 },
    Median,
    FriedkinJohnsen { susceptibility: f64, state_dependent: bool },
    WeightedFriedkinJohnsen { susceptibility: f64 },
}

impl OpinionModel {
    /// Binds a method name to its parameters.
    pub fn from_method(method: OpinionMethod, susceptibility: f64, decay_factor: f64) -> Self {
        match method {
            OpinionMethod::WeightedMean => OpinionModel::WeightedMean { decay_factor },
            OpinionMethod::Median => OpinionModel::Median,
            OpinionMethod::FriedkinJohnsen => OpinionModel::FriedkinJohnsen {
                susceptibility,
                state_dependent: false,
            },
            OpinionMethod::StateDependentFj => OpinionModel::FriedkinJohnsen {
                susceptibility,
                state_dependent: true,
            },
            OpinionMethod::WeightedFriedkinJohnsen => {
                OpinionModel::WeightedFriedkinJohnsen { susceptibility }
            }
        }
    }

    /// Rejects parameters outside their domain.
    pub fn validate(&self) -> EngineResult<()> {
        match *self {
            OpinionModel::WeightedMean { decay_factor } => {
                if !decay_factor.is_finite() || decay_factor < 0.0 {
                    return Err(EngineError::invalid(format!(
                        "decay factor must be a non-negative number, got {decay_factor}"
                    )));
                }
            }
            OpinionModel::Median => {}
            OpinionModel::FriedkinJohnsen { susceptibility, .. }
            | OpinionModel::WeightedFriedkinJohnsen { susceptibility } => {
                validate_susceptibility(susceptibility)?;
            }
        }
        Ok(())
    }

    /// Computes the next score for `user` on `topic` without persisting it.
    pub fn evaluate<S: SocialStore + ?Sized>(
        &self,
        store: &S,
        config: &EngineConfig,
        user: UserId,
        topic: TopicId,
    ) -> EngineResult<f64> {
        match *self {
            OpinionModel::WeightedMean { decay_factor } => {
                Ok(weighted_mean(store, user, topic, decay_factor))
            }
            OpinionModel::Median => Ok(median(store, user, topic)),
            OpinionModel::FriedkinJohnsen {
                susceptibility,
                state_dependent,
            } => friedkin_johnsen(store, user, topic, susceptibility, state_dependent),
            OpinionModel::WeightedFriedkinJohnsen { susceptibility } => {
                Ok(weighted_friedkin_johnsen(
                    store,
                    &config.influence,
                    config.opinion.neutral_anchor,
                    user,
                    topic,
                    susceptibility,
                ))
            }
        }
    }
}

pub(crate) fn validate_susceptibility(susceptibility: f64) -> EngineResult<()> {
    if (0.0..=1.0).contains(&susceptibility) {
        Ok(())
    } else {
        Err(EngineError::invalid(format!(
            "susceptibility must lie in [0, 1], got {susceptibility}"
        )))
    }
}

/// Current opinion: the record with the largest round, later insertions
/// winning ties.
pub fn latest_record(history: &[OpinionRecord]) -> Option<&OpinionRecord> {
    history
        .iter()
        .enumerate()
        .max_by_key(|(index, record)| (record.round, *index))
        .map(|(_, record)| record)
}

/// Initial opinion: the round-0 record, or the earliest record for users who
/// joined after round 0.
pub fn initial_record(history: &[OpinionRecord]) -> Option<&OpinionRecord> {
    history
        .iter()
        .find(|record| record.round == 0)
        .or_else(|| history.iter().min_by_key(|record| record.round))
}
