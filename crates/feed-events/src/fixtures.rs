//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // feed-events = { path = "../feed-events", features = ["test-fixtures"] }
//!
//! use feed_events::fixtures;
//!
//! let dataset = fixtures::sample_dataset();
//! ```

use crate::Dataset;

/// Returns the sample dataset from the fixtures file.
///
/// Contains rounds 0 through 10 and:
/// - 4 regular users (alice, bob, dave lean left; carol leans right)
/// - 2 news pages (left_news, right_news)
/// - 2 topics (climate, economy)
/// - 8 posts, including 2 articles and 1 comment on post 1
/// - alice follows bob and dave, and unfollowed carol in round 5
/// - round-0 opinions on climate for every regular user
pub fn sample_dataset() -> Dataset {
    let json = include_str!("../tests/fixtures/sample_dataset.json");
    Dataset::from_json(json).expect("Failed to parse sample_dataset.json")
}

pub mod ids {
    //! Well-known ids inside the sample dataset.
    use crate::{PostId, TopicId, UserId};

    pub const ALICE: UserId = 1;
    pub const BOB: UserId = 2;
    pub const CAROL: UserId = 3;
    pub const DAVE: UserId = 4;
    pub const LEFT_NEWS: UserId = 5;
    pub const RIGHT_NEWS: UserId = 6;

    pub const CLIMATE: TopicId = 1;
    pub const ECONOMY: TopicId = 2;

    pub const BOB_CLIMATE_POST: PostId = 1;
    pub const CAROL_ECONOMY_POST: PostId = 2;
    pub const ALICE_CLIMATE_POST: PostId = 3;
    pub const DAVE_CLIMATE_POST: PostId = 4;
    pub const LEFT_ARTICLE: PostId = 5;
    pub const RIGHT_ARTICLE: PostId = 6;
    pub const BOB_MENTIONS_ALICE: PostId = 7;
    pub const CAROL_COMMENT: PostId = 8;
}
