//! CLI definitions
//!
//! Subcommands for serving the search API, importing catalog data,
//! replaying benchmarks, and running one-off queries.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Medicine catalog search utility
#[derive(Parser)]
#[command(name = "medsearch")]
#[command(about = "Medicine catalog search: prefix, substring, smart and fuzzy matching", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP search server
    Serve(ServeArgs),
    /// Import raw JSON data files into a catalog file
    Import(ImportArgs),
    /// Replay canned queries against a running server
    Bench(BenchArgs),
    /// Run a single search against a catalog file
    Query(QueryArgs),
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "MEDSEARCH_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(short, long, env = "MEDSEARCH_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Catalog file produced by `medsearch import`
    #[arg(short, long, env = "MEDSEARCH_CATALOG", default_value = "catalog.json")]
    pub catalog: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Directory of raw *.json data files
    #[arg(short, long)]
    pub data_dir: PathBuf,

    /// Catalog file to write
    #[arg(short, long, default_value = "catalog.json")]
    pub out: PathBuf,
}

#[derive(Parser, Debug)]
pub struct BenchArgs {
    /// Base URL of a running medsearch server
    #[arg(long, default_value = "http://localhost:8000")]
    pub url: String,

    /// Benchmark queries file
    #[arg(short, long, default_value = "benchmark_queries.json")]
    pub queries: PathBuf,

    /// Results file to write
    #[arg(short, long, default_value = "benchmark_results.json")]
    pub output: PathBuf,

    /// Submission file to write
    #[arg(long, default_value = "submission.json")]
    pub submission: PathBuf,

    /// Iterations per query
    #[arg(short, long, default_value_t = 5)]
    pub iterations: usize,
}

#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// Catalog file to search
    #[arg(short, long, default_value = "catalog.json")]
    pub catalog: PathBuf,

    /// Search mode: prefix, substring, smart or fuzzy
    #[arg(short, long, default_value = "smart")]
    pub mode: String,

    /// Query text (case-insensitive)
    #[arg(short = 'q', long)]
    pub query: String,
}
