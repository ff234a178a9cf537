//! Opinion request operations: computing and persisting updates, seeding
//! initial opinions, and reading the current state back.

use feed_events::{round_score, OpinionRecord, RoundId, TopicId, UserId};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{latest_record, OpinionMethod, OpinionModel};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::SocialStore;

/// One opinion update covering several topics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpinionUpdate {
    pub user: UserId,
    /// Topic names to update
    pub interests: Vec<String>,
    /// Falls back to the configured default method
    #[serde(default)]
    pub method: Option<OpinionMethod>,
    /// Round the new records are stamped with
    pub round: RoundId,
    /// Falls back to the configured default susceptibility
    #[serde(default)]
    pub susceptibility: Option<f64>,
    /// Per-interest LLM scores; a missing entry reuses the previous one
    #[serde(default)]
    pub llm_scores: Vec<Option<f64>>,
    /// Per-interest free-text descriptions
    #[serde(default)]
    pub descriptions: Vec<Option<String>>,
}

impl OpinionUpdate {
    pub fn new(user: UserId, interests: Vec<String>, round: RoundId) -> Self {
        Self {
            user,
            interests,
            method: None,
            round,
            susceptibility: None,
            llm_scores: Vec::new(),
            descriptions: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: OpinionMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_susceptibility(mut self, susceptibility: f64) -> Self {
        self.susceptibility = Some(susceptibility);
        self
    }

    /// Resolves the model this update runs under.
    pub fn model(&self, config: &EngineConfig) -> OpinionModel {
        OpinionModel::from_method(
            self.method.unwrap_or(config.opinion.default_method),
            self.susceptibility
                .unwrap_or(config.opinion.default_susceptibility),
            config.opinion.decay_factor,
        )
    }

    pub fn validate(&self, config: &EngineConfig) -> EngineResult<()> {
        if self.interests.is_empty() {
            return Err(EngineError::invalid("no interests to update"));
        }
        for (name, len) in [
            ("llm_scores", self.llm_scores.len()),
            ("descriptions", self.descriptions.len()),
        ] {
            if len != 0 && len != self.interests.len() {
                return Err(EngineError::invalid(format!(
                    "{name} has {len} entries for {} interests",
                    self.interests.len()
                )));
            }
        }
        if self.llm_scores.iter().flatten().any(|s| !s.is_finite()) {
            return Err(EngineError::invalid("llm scores must be finite"));
        }
        self.model(config).validate()
    }
}

/// A coalition's stance on one topic, used to seed initial opinions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoalitionStance {
    pub topic: String,
    pub score: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Current opinion on one topic as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionView {
    pub topic: String,
    pub score: f64,
    pub score_llm: f64,
    pub description: Option<String>,
}

fn require_user<S: SocialStore + ?Sized>(store: &S, user: UserId) -> EngineResult<()> {
    store
        .user(user)
        .map(|_| ())
        .ok_or(EngineError::UserNotFound(user))
}

fn resolve_topic<S: SocialStore + ?Sized>(store: &S, name: &str) -> EngineResult<TopicId> {
    store
        .topic_by_name(name)
        .map(|topic| topic.id)
        .ok_or_else(|| EngineError::TopicNotFound(name.to_string()))
}

/// Computes and appends one record per interest.
///
/// Every score is computed before anything is written, so a failing topic
/// leaves the log untouched.
pub fn update_opinion<S: SocialStore + ?Sized>(
    store: &mut S,
    config: &EngineConfig,
    update: &OpinionUpdate,
) -> EngineResult<Vec<OpinionRecord>> {
    update.validate(config)?;
    require_user(&*store, update.user)?;

    let model = update.model(config);
    let precision = config.opinion.score_precision;
    let mut records = Vec::with_capacity(update.interests.len());

    for (i, name) in update.interests.iter().enumerate() {
        let topic = resolve_topic(&*store, name)?;
        let score = model.evaluate(&*store, config, update.user, topic)?;
        let score_llm = match update.llm_scores.get(i).copied().flatten() {
            Some(score_llm) => score_llm,
            None => {
                latest_record(store.opinion_history(update.user, topic))
                    .ok_or(EngineError::MissingOpinion {
                        user: update.user,
                        topic,
                    })?
                    .score_llm
            }
        };

        records.push(OpinionRecord {
            user: update.user,
            topic,
            round: update.round,
            score: round_score(score, precision),
            score_llm: round_score(score_llm, precision),
            description: update.descriptions.get(i).cloned().flatten(),
        });
    }

    for record in &records {
        store.append_opinion(record.clone());
    }
    info!(
        user = update.user,
        round = update.round,
        topics = records.len(),
        ?model,
        "opinions updated"
    );
    Ok(records)
}

/// Seeds a user's initial opinions at the round the user joined.
pub fn init_opinions<S: SocialStore + ?Sized>(
    store: &mut S,
    user: UserId,
    stances: &[CoalitionStance],
) -> EngineResult<Vec<OpinionRecord>> {
    let joined_on = store
        .user(user)
        .map(|u| u.joined_on)
        .ok_or(EngineError::UserNotFound(user))?;

    let mut records = Vec::with_capacity(stances.len());
    for stance in stances {
        if !stance.score.is_finite() {
            return Err(EngineError::invalid(format!(
                "score for '{}' must be finite",
                stance.topic
            )));
        }
        let topic = resolve_topic(&*store, &stance.topic)?;
        records.push(OpinionRecord {
            user,
            topic,
            round: joined_on,
            score: stance.score,
            score_llm: stance.score,
            description: stance.description.clone(),
        });
    }

    for record in &records {
        store.append_opinion(record.clone());
    }
    info!(user, topics = records.len(), "initial opinions seeded");
    Ok(records)
}

/// Latest opinion per named topic. Topics without history are omitted.
pub fn get_opinions<S: SocialStore + ?Sized>(
    store: &S,
    user: UserId,
    interests: &[String],
) -> EngineResult<Vec<OpinionView>> {
    require_user(store, user)?;

    let mut views = Vec::new();
    for name in interests {
        let topic = resolve_topic(store, name)?;
        if let Some(record) = latest_record(store.opinion_history(user, topic)) {
            views.push(OpinionView {
                topic: name.clone(),
                score: record.score,
                score_llm: record.score_llm,
                description: record.description.clone(),
            });
        }
    }
    Ok(views)
}

/// Largest round among all of the user's opinion records, 0 if none.
pub fn last_opinion_round<S: SocialStore + ?Sized>(store: &S, user: UserId) -> EngineResult<RoundId> {
    require_user(store, user)?;
    Ok(store
        .opinions_of(user)
        .iter()
        .map(|record| record.round)
        .max()
        .unwrap_or(0))
}
