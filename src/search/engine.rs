//! Search engine orchestration
//!
//! One sequential fetch-score-sort-truncate pipeline per mode. The engine
//! holds no per-request state, so a shared store can serve concurrent
//! requests without any locking.

use super::ranking::RankTier;
use super::similarity::similarity;
use crate::error::{validate_query, AppError};
use crate::store::{Medicine, RecordStore, StoreError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

/// Maximum result count for every mode
pub const RESULT_CAP: usize = 100;

/// Fuzzy results at or below this similarity are dropped before truncation
pub const SIMILARITY_FLOOR: f64 = 0.1;

/// Length of the query prefix used to broaden fuzzy candidate fetches
const FUZZY_ALT_LEN: usize = 3;

/// The four matching strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Prefix,
    Substring,
    /// Tier-ranked containment matching ("fulltext" on the legacy wire)
    #[serde(alias = "fulltext")]
    Smart,
    Fuzzy,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Prefix => "prefix",
            Mode::Substring => "substring",
            Mode::Smart => "smart",
            Mode::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefix" => Ok(Mode::Prefix),
            "substring" => Ok(Mode::Substring),
            "smart" | "fulltext" => Ok(Mode::Smart),
            "fuzzy" => Ok(Mode::Fuzzy),
            other => Err(AppError::InvalidQuery(format!(
                "Unknown search mode: {}",
                other
            ))),
        }
    }
}

/// A record plus its mode-specific score.
///
/// `rank` is present only for smart mode, `similarity_score` only for fuzzy;
/// prefix and substring results carry neither.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredResult {
    #[serde(flatten)]
    pub record: Medicine,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

impl ScoredResult {
    fn unscored(record: Medicine) -> Self {
        Self {
            record,
            rank: None,
            similarity_score: None,
        }
    }
}

/// The complete answer to one search request
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    #[serde(rename = "type")]
    pub mode: Mode,
    pub results: Vec<ScoredResult>,
    pub count: usize,
    pub execution_time_ms: f64,
}

/// Pure search pipeline over a [`RecordStore`]
pub struct SearchEngine<S> {
    store: S,
}

impl<S: RecordStore> SearchEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run one search: validate, fetch candidates, score, sort, truncate.
    ///
    /// Elapsed time covers everything from just after validation to just
    /// before returning, including the store fetch. A store failure aborts
    /// the whole request; an empty result set is a successful response.
    pub fn search(&self, mode: Mode, query: &str) -> Result<SearchResponse, AppError> {
        let query = validate_query(query)?;
        let started = Instant::now();

        let results = match mode {
            Mode::Prefix => self.prefix_results(&query)?,
            Mode::Substring => self.substring_results(&query)?,
            Mode::Smart => self.smart_results(&query)?,
            Mode::Fuzzy => self.fuzzy_results(&query)?,
        };

        let execution_time_ms = round_ms(started.elapsed().as_secs_f64() * 1000.0);
        debug!(
            "{} search for {:?}: {} results in {}ms",
            mode,
            query,
            results.len(),
            execution_time_ms
        );

        Ok(SearchResponse {
            query,
            mode,
            count: results.len(),
            results,
            execution_time_ms,
        })
    }

    fn prefix_results(&self, query: &str) -> Result<Vec<ScoredResult>, AppError> {
        let mut records = self.store.fetch_by_prefix(query).map_err(store_failure)?;
        records.truncate(RESULT_CAP);
        Ok(records.into_iter().map(ScoredResult::unscored).collect())
    }

    fn substring_results(&self, query: &str) -> Result<Vec<ScoredResult>, AppError> {
        let mut records = self.store.fetch_by_contains(query).map_err(store_failure)?;
        records.truncate(RESULT_CAP);
        Ok(records.into_iter().map(ScoredResult::unscored).collect())
    }

    fn smart_results(&self, query: &str) -> Result<Vec<ScoredResult>, AppError> {
        let records = self.store.fetch_by_contains(query).map_err(store_failure)?;
        let query_lower = query.to_lowercase();

        let mut scored: Vec<(RankTier, Medicine)> = records
            .into_iter()
            .map(|record| {
                let tier = RankTier::classify(&record.name.to_lowercase(), &query_lower);
                (tier, record)
            })
            .collect();

        // Tier order is rank-descending; names break ties ascending.
        scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.name.cmp(&b.1.name)));
        scored.truncate(RESULT_CAP);

        Ok(scored
            .into_iter()
            .map(|(tier, record)| ScoredResult {
                record,
                rank: Some(tier.score()),
                similarity_score: None,
            })
            .collect())
    }

    fn fuzzy_results(&self, query: &str) -> Result<Vec<ScoredResult>, AppError> {
        // Broaden recall with the first three characters; queries shorter
        // than that use the whole query.
        let alt: String = query.chars().take(FUZZY_ALT_LEN).collect();
        let candidates = self.store.fetch_broad(query, &alt).map_err(store_failure)?;

        let mut scored: Vec<(f64, Medicine)> = candidates
            .into_iter()
            .filter_map(|record| {
                let score = similarity(query, &record.name);
                (score > SIMILARITY_FLOOR).then_some((score, record))
            })
            .collect();

        // Stable sort: equal similarities keep fetch order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(RESULT_CAP);

        Ok(scored
            .into_iter()
            .map(|(score, record)| ScoredResult {
                record,
                rank: None,
                similarity_score: Some(score),
            })
            .collect())
    }
}

fn store_failure(err: StoreError) -> AppError {
    AppError::StoreUnavailable(err.to_string())
}

/// Round to two decimal places for the wire
fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn sample_engine() -> SearchEngine<MemoryStore> {
        SearchEngine::new(MemoryStore::from_records(vec![
            Medicine::named("Paracetamol 500mg"),
            Medicine::named("Paracetamol Plus"),
            Medicine::named("Ibuprofen 200mg"),
        ]))
    }

    fn names(response: &SearchResponse) -> Vec<&str> {
        response
            .results
            .iter()
            .map(|r| r.record.name.as_str())
            .collect()
    }

    #[test]
    fn test_prefix_end_to_end() {
        let engine = sample_engine();
        let response = engine.search(Mode::Prefix, "paracetamol").unwrap();

        assert_eq!(names(&response), vec!["Paracetamol 500mg", "Paracetamol Plus"]);
        assert_eq!(response.count, 2);
        assert!(response.results.iter().all(|r| r.rank.is_none()));
        assert!(response.results.iter().all(|r| r.similarity_score.is_none()));
    }

    #[test]
    fn test_substring_sorted_by_name() {
        let engine = sample_engine();
        let response = engine.search(Mode::Substring, "mg").unwrap();
        assert_eq!(names(&response), vec!["Ibuprofen 200mg", "Paracetamol 500mg"]);
    }

    #[test]
    fn test_smart_tier_assignment() {
        let engine = SearchEngine::new(MemoryStore::from_records(vec![
            Medicine::named("abc"),
            Medicine::named("abc def"),
            Medicine::named("xx abc yy"),
            Medicine::named("xyzabc"),
            Medicine::named("abcxyz"),
        ]));

        let response = engine.search(Mode::Smart, "abc").unwrap();
        assert_eq!(
            names(&response),
            vec!["abc", "abc def", "xx abc yy", "xyzabc", "abcxyz"]
        );
        let ranks: Vec<f64> = response.results.iter().map(|r| r.rank.unwrap()).collect();
        assert_eq!(ranks, vec![1.0, 0.9, 0.8, 0.7, 0.6]);
    }

    #[test]
    fn test_smart_ties_break_by_name() {
        let engine = SearchEngine::new(MemoryStore::from_records(vec![
            Medicine::named("Dolo B"),
            Medicine::named("Dolo A"),
        ]));

        let response = engine.search(Mode::Smart, "dolo").unwrap();
        assert_eq!(names(&response), vec!["Dolo A", "Dolo B"]);
    }

    #[test]
    fn test_fuzzy_misspelling_recall() {
        let engine = sample_engine();
        let response = engine.search(Mode::Fuzzy, "paracetmol").unwrap();

        let got = names(&response);
        let para_positions: Vec<usize> = got
            .iter()
            .enumerate()
            .filter(|(_, n)| n.starts_with("Paracetamol"))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(para_positions.len(), 2);

        // both Paracetamol entries rank above Ibuprofen, if it survives at all
        if let Some(ibu) = got.iter().position(|n| n.starts_with("Ibuprofen")) {
            assert!(para_positions.iter().all(|&p| p < ibu));
        }
    }

    #[test]
    fn test_fuzzy_scores_above_floor_and_sorted() {
        let engine = sample_engine();
        let response = engine.search(Mode::Fuzzy, "paracetamol").unwrap();

        let scores: Vec<f64> = response
            .results
            .iter()
            .map(|r| r.similarity_score.unwrap())
            .collect();
        assert!(!scores.is_empty());
        assert!(scores.iter().all(|&s| s > SIMILARITY_FLOOR && s <= 1.0));
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_result_cap() {
        let records: Vec<Medicine> = (0..250)
            .map(|i| Medicine::named(&format!("Vitamin {:03}", i)))
            .collect();
        let engine = SearchEngine::new(MemoryStore::from_records(records));

        for mode in [Mode::Prefix, Mode::Substring, Mode::Smart, Mode::Fuzzy] {
            let response = engine.search(mode, "vitamin").unwrap();
            assert_eq!(response.count, RESULT_CAP, "mode {}", mode);
        }
    }

    #[test]
    fn test_idempotence() {
        let engine = sample_engine();
        for mode in [Mode::Prefix, Mode::Substring, Mode::Smart, Mode::Fuzzy] {
            let first = engine.search(mode, "para").unwrap();
            let second = engine.search(mode, "para").unwrap();
            assert_eq!(names(&first), names(&second), "mode {}", mode);
        }
    }

    #[test]
    fn test_short_query_uses_whole_query_for_broadening() {
        let engine = sample_engine();
        // two-character query must not panic and must still search
        let response = engine.search(Mode::Fuzzy, "ib").unwrap();
        assert!(response.results.iter().all(|r| r.similarity_score.is_some()));
    }

    #[test]
    fn test_validation_rejected_before_store() {
        let engine = sample_engine();
        assert!(matches!(
            engine.search(Mode::Prefix, "   "),
            Err(AppError::InvalidQuery(_))
        ));
        assert!(matches!(
            engine.search(Mode::Fuzzy, &"x".repeat(101)),
            Err(AppError::InvalidQuery(_))
        ));
        // exactly 100 characters is accepted
        assert!(engine.search(Mode::Substring, &"x".repeat(100)).is_ok());
    }

    #[test]
    fn test_no_matches_is_success() {
        let engine = sample_engine();
        let response = engine.search(Mode::Substring, "zzz").unwrap();
        assert_eq!(response.count, 0);
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_store_failure_aborts_request() {
        struct DownStore;

        impl RecordStore for DownStore {
            fn fetch_by_prefix(&self, _: &str) -> Result<Vec<Medicine>, StoreError> {
                Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "connection refused",
                )))
            }
            fn fetch_by_contains(&self, _: &str) -> Result<Vec<Medicine>, StoreError> {
                self.fetch_by_prefix("")
            }
            fn fetch_broad(&self, _: &str, _: &str) -> Result<Vec<Medicine>, StoreError> {
                self.fetch_by_prefix("")
            }
        }

        let engine = SearchEngine::new(DownStore);
        for mode in [Mode::Prefix, Mode::Substring, Mode::Smart, Mode::Fuzzy] {
            assert!(matches!(
                engine.search(mode, "anything"),
                Err(AppError::StoreUnavailable(_))
            ));
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("prefix".parse::<Mode>().unwrap(), Mode::Prefix);
        assert_eq!("smart".parse::<Mode>().unwrap(), Mode::Smart);
        assert_eq!("fulltext".parse::<Mode>().unwrap(), Mode::Smart);
        assert!("banana".parse::<Mode>().is_err());
    }

    #[test]
    fn test_response_wire_shape() {
        let engine = sample_engine();
        let response = engine.search(Mode::Smart, "paracetamol plus").unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["type"], "smart");
        assert_eq!(json["query"], "paracetamol plus");
        assert_eq!(json["count"], 1);
        let first = &json["results"][0];
        assert_eq!(first["name"], "Paracetamol Plus");
        assert_eq!(first["rank"], 1.0);
        assert!(first.get("similarity_score").is_none());
    }
}
