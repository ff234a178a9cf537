//! Request/response boundary.
//!
//! Requests arrive as `{"method": ..., "args": {...}}` documents. Malformed
//! documents are rejected by deserialization before reaching the engine;
//! every operation validates its own numeric arguments before reading.

use feed_events::{
    FollowEvent, OpinionRecord, PostId, ReactionEvent, RoundId, SeedPost, UserId,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info_span, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::feed::{read_mentions, search, select_feed, FeedRequest};
use crate::opinion::{
    get_opinions, init_opinions, last_opinion_round, update_opinion, CoalitionStance,
    OpinionUpdate, OpinionView,
};
use crate::store::{MemoryStore, ReactionOutcome, SocialStore};

/// A single call into the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "args", rename_all = "snake_case")]
pub enum Request {
    /// Timeline read
    Read(FeedRequest),
    Search {
        reader: UserId,
        visibility_rounds: u64,
    },
    ReadMentions {
        reader: UserId,
        visibility_rounds: u64,
    },
    UpdateOpinion(OpinionUpdate),
    InitOpinions {
        user: UserId,
        stances: Vec<CoalitionStance>,
    },
    GetOpinions {
        user: UserId,
        interests: Vec<String>,
    },
    GetLastOpinionRound {
        user: UserId,
    },
    AddReaction(ReactionEvent),
    Follow(FollowEvent),
    /// Root post, or a comment when `comment_to` is set
    Post(SeedPost),
    NewRound,
}

impl Request {
    pub fn method(&self) -> &'static str {
        match self {
            Request::Read(_) => "read",
            Request::Search { .. } => "search",
            Request::ReadMentions { .. } => "read_mentions",
            Request::UpdateOpinion(_) => "update_opinion",
            Request::InitOpinions { .. } => "init_opinions",
            Request::GetOpinions { .. } => "get_opinions",
            Request::GetLastOpinionRound { .. } => "get_last_opinion_round",
            Request::AddReaction(_) => "add_reaction",
            Request::Follow(_) => "follow",
            Request::Post(_) => "post",
            Request::NewRound => "new_round",
        }
    }

    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Result of a call.
///
/// `Empty` is a valid outcome (nothing pending, nothing to search with);
/// `NotFound` means the request referenced something that does not exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    PostIds { post_ids: Vec<PostId> },
    Records { records: Vec<OpinionRecord> },
    Opinions { opinions: Vec<OpinionView> },
    Round { round: RoundId },
    Reaction { outcome: ReactionOutcome },
    Created { id: u64 },
    Ok,
    Empty { reason: String },
    NotFound { message: String },
    Rejected { message: String },
}

impl Response {
    fn empty(reason: &str) -> Self {
        Response::Empty {
            reason: reason.to_string(),
        }
    }
}

impl From<EngineError> for Response {
    fn from(error: EngineError) -> Self {
        if error.is_not_found() {
            Response::NotFound {
                message: error.to_string(),
            }
        } else {
            Response::Rejected {
                message: error.to_string(),
            }
        }
    }
}

/// The engine: a store, its configuration, and the seeded random source
/// behind random feeds, search sampling and mention selection.
pub struct Engine<S> {
    store: S,
    config: EngineConfig,
    rng: SmallRng,
}

impl<S: SocialStore> Engine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        let rng = SmallRng::seed_from_u64(config.engine.seed);
        Self { store, config, rng }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn read(&mut self, request: &FeedRequest) -> EngineResult<Vec<PostId>> {
        select_feed(&mut self.store, &mut self.rng, &self.config.feed, request)
    }

    pub fn search(
        &mut self,
        reader: UserId,
        visibility_rounds: u64,
    ) -> EngineResult<Option<Vec<PostId>>> {
        search(
            &self.store,
            &mut self.rng,
            &self.config.feed,
            reader,
            visibility_rounds,
        )
    }

    pub fn read_mentions(
        &mut self,
        reader: UserId,
        visibility_rounds: u64,
    ) -> EngineResult<Option<PostId>> {
        read_mentions(&mut self.store, &mut self.rng, reader, visibility_rounds)
    }

    pub fn update_opinion(&mut self, update: &OpinionUpdate) -> EngineResult<Vec<OpinionRecord>> {
        update_opinion(&mut self.store, &self.config, update)
    }
}

impl Engine<MemoryStore> {
    /// Handles one request, turning failures into responses.
    pub fn handle(&mut self, request: Request) -> Response {
        let span = info_span!("request", method = request.method());
        let _guard = span.enter();

        self.dispatch(request).unwrap_or_else(|error| {
            warn!(%error, "request failed");
            Response::from(error)
        })
    }

    fn dispatch(&mut self, request: Request) -> EngineResult<Response> {
        let response = match request {
            Request::Read(feed) => Response::PostIds {
                post_ids: self.read(&feed)?,
            },
            Request::Search {
                reader,
                visibility_rounds,
            } => match self.search(reader, visibility_rounds)? {
                Some(post_ids) => Response::PostIds { post_ids },
                None => Response::empty("no recent hashtags"),
            },
            Request::ReadMentions {
                reader,
                visibility_rounds,
            } => match self.read_mentions(reader, visibility_rounds)? {
                Some(post) => Response::PostIds {
                    post_ids: vec![post],
                },
                None => Response::empty("no pending mentions"),
            },
            Request::UpdateOpinion(update) => Response::Records {
                records: self.update_opinion(&update)?,
            },
            Request::InitOpinions { user, stances } => Response::Records {
                records: init_opinions(&mut self.store, user, &stances)?,
            },
            Request::GetOpinions { user, interests } => Response::Opinions {
                opinions: get_opinions(&self.store, user, &interests)?,
            },
            Request::GetLastOpinionRound { user } => Response::Round {
                round: last_opinion_round(&self.store, user)?,
            },
            Request::AddReaction(reaction) => Response::Reaction {
                outcome: self.store.add_reaction(reaction)?,
            },
            Request::Follow(event) => {
                self.store.add_follow(event)?;
                Response::Ok
            }
            Request::Post(seed) => Response::Created {
                id: self.store.publish(&seed)?,
            },
            Request::NewRound => Response::Round {
                round: self.store.advance_round(),
            },
        };
        Ok(response)
    }
}
