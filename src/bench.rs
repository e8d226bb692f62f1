//! Benchmark replay utility
//!
//! Replays a canned query set against a running search server, records
//! per-query latency statistics and the returned medicine names, and writes
//! the results and submission files.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// One canned query from the queries file
#[derive(Debug, Clone, Deserialize)]
pub struct BenchQuery {
    #[serde(rename = "type")]
    pub mode: String,
    pub query: String,
}

/// The queries file shape: `{"queries": {"<id>": {"type": ..., "query": ...}}}`
#[derive(Debug, Deserialize)]
struct QueriesFile {
    queries: BTreeMap<String, BenchQuery>,
}

/// Latency statistics for one query over several iterations
#[derive(Debug, Serialize)]
pub struct QueryStats {
    pub avg_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    pub std_dev_ms: f64,
    pub results_count: usize,
}

pub struct BenchmarkRunner {
    base_url: String,
    client: reqwest::Client,
    iterations: usize,
}

impl BenchmarkRunner {
    pub fn new(base_url: &str, iterations: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("medsearch/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            iterations,
        }
    }

    /// Check the server is reachable before replaying anything
    pub async fn check_health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("cannot connect to {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("server health check failed: HTTP {}", response.status());
        }
        Ok(())
    }

    /// Run one query `iterations` times; returns stats plus the result names
    /// from the last successful response.
    pub async fn run_single_query(
        &self,
        mode: &str,
        query: &str,
    ) -> Result<(QueryStats, Vec<String>)> {
        let url = format!("{}/search/{}", self.base_url, mode);

        let mut latencies = Vec::new();
        let mut names = Vec::new();

        for _ in 0..self.iterations {
            let started = Instant::now();
            let response = match self.client.get(&url).query(&[("q", query)]).send().await {
                Ok(r) => r,
                Err(e) => {
                    warn!("Error running query {}:{:?} - {}", mode, query, e);
                    continue;
                }
            };
            if !response.status().is_success() {
                warn!(
                    "Query {}:{:?} failed with HTTP {}",
                    mode,
                    query,
                    response.status()
                );
                continue;
            }

            let body: serde_json::Value = response.json().await?;
            latencies.push(started.elapsed().as_secs_f64() * 1000.0);

            names = body["results"]
                .as_array()
                .map(|results| {
                    results
                        .iter()
                        .filter_map(|r| r["name"].as_str())
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default();
        }

        if latencies.is_empty() {
            anyhow::bail!("all iterations failed for query {}:{:?}", mode, query);
        }

        Ok((stats_from_latencies(&latencies, names.len()), names))
    }

    /// Replay every query in the file and write the results and submission
    /// files in the `{"results": {id: [names]}}` shape.
    pub async fn run_benchmarks(
        &self,
        queries_file: &Path,
        output_file: &Path,
        submission_file: &Path,
    ) -> Result<()> {
        let data = fs::read_to_string(queries_file)
            .with_context(|| format!("benchmark file not found: {}", queries_file.display()))?;
        let parsed: QueriesFile = serde_json::from_str(&data)?;

        info!("Running {} benchmark queries", parsed.queries.len());

        let mut results: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut stats: BTreeMap<String, QueryStats> = BTreeMap::new();

        for (id, query) in &parsed.queries {
            info!("Running query {}: {} - {:?}", id, query.mode, query.query);

            match self.run_single_query(&query.mode, &query.query).await {
                Ok((query_stats, names)) => {
                    info!(
                        "  {} results, avg {:.2}ms (min {:.2}, max {:.2}, stddev {:.2})",
                        query_stats.results_count,
                        query_stats.avg_latency_ms,
                        query_stats.min_latency_ms,
                        query_stats.max_latency_ms,
                        query_stats.std_dev_ms
                    );
                    stats.insert(id.clone(), query_stats);
                    let entry = results.entry(id.clone()).or_default();
                    entry.extend(names);
                    *entry = dedupe_preserving_order(entry);
                }
                Err(e) => {
                    warn!("  query {} failed: {}", id, e);
                    results.entry(id.clone()).or_default();
                }
            }
        }

        let payload = json!({
            "generated_at": Utc::now().to_rfc3339(),
            "stats": stats,
            "results": results,
        });
        fs::write(output_file, serde_json::to_string_pretty(&payload)?)?;
        info!("Benchmark results saved to {}", output_file.display());

        let submission = json!({ "results": results });
        fs::write(submission_file, serde_json::to_string_pretty(&submission)?)?;
        info!("Submission file generated: {}", submission_file.display());

        Ok(())
    }
}

fn stats_from_latencies(latencies: &[f64], results_count: usize) -> QueryStats {
    let n = latencies.len() as f64;
    let avg = latencies.iter().sum::<f64>() / n;
    let min = latencies.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = latencies.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let std_dev = if latencies.len() > 1 {
        let variance = latencies
            .iter()
            .map(|l| (l - avg).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        variance.sqrt()
    } else {
        0.0
    };

    QueryStats {
        avg_latency_ms: avg,
        min_latency_ms: min,
        max_latency_ms: max,
        std_dev_ms: std_dev,
        results_count,
    }
}

/// Drop duplicate names while keeping first-seen order
fn dedupe_preserving_order(names: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .iter()
        .filter(|n| seen.insert(n.as_str().to_string()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_file_parsing() {
        let raw = r#"{
            "queries": {
                "1": {"type": "prefix", "query": "para"},
                "2": {"type": "fulltext", "query": "dolo"}
            }
        }"#;
        let parsed: QueriesFile = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.queries.len(), 2);
        assert_eq!(parsed.queries["1"].mode, "prefix");
        assert_eq!(parsed.queries["2"].query, "dolo");
    }

    #[test]
    fn test_dedupe_preserving_order() {
        let names = vec![
            "Dolo 650".to_string(),
            "Crocin".to_string(),
            "Dolo 650".to_string(),
            "Calpol".to_string(),
        ];
        assert_eq!(
            dedupe_preserving_order(&names),
            vec!["Dolo 650", "Crocin", "Calpol"]
        );
    }

    #[test]
    fn test_latency_stats() {
        let stats = stats_from_latencies(&[10.0, 20.0, 30.0], 7);
        assert_eq!(stats.avg_latency_ms, 20.0);
        assert_eq!(stats.min_latency_ms, 10.0);
        assert_eq!(stats.max_latency_ms, 30.0);
        assert_eq!(stats.results_count, 7);
        assert!((stats.std_dev_ms - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample_has_zero_stddev() {
        let stats = stats_from_latencies(&[42.0], 0);
        assert_eq!(stats.std_dev_ms, 0.0);
    }
}
