//! Search core: the four matching strategies and their scoring rules

pub mod engine;
pub mod ranking;
pub mod similarity;

pub use engine::{Mode, ScoredResult, SearchEngine, SearchResponse, RESULT_CAP, SIMILARITY_FLOOR};
pub use ranking::RankTier;
pub use similarity::similarity;
