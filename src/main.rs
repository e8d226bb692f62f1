//! medsearch: medicine catalog search service
//!
//! Four matching strategies over a catalog of medicine records:
//! - `prefix`    - anchored, case-insensitive name match
//! - `substring` - containment match
//! - `smart`     - containment match ranked by a fixed six-tier table
//! - `fuzzy`     - misspelling-tolerant match via a similarity heuristic
//!
//! Runs as an HTTP server (`serve`), a bulk importer (`import`), a benchmark
//! replay client (`bench`), or a one-off CLI search (`query`).

mod bench;
mod cli;
mod error;
mod search;
mod server;
mod store;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use search::{Mode, SearchEngine};
use store::MemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flags, stderr keeps stdout clean
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => server::run(&args.host, args.port, &args.catalog).await,
        Commands::Import(args) => {
            store::import_catalog(&args.data_dir, &args.out).map(|_| ())
        }
        Commands::Bench(args) => execute_bench(args).await,
        Commands::Query(args) => execute_query(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(get_exit_code(&e));
    }

    Ok(())
}

/// Run the benchmark replay against a live server
async fn execute_bench(args: cli::BenchArgs) -> Result<()> {
    let runner = bench::BenchmarkRunner::new(&args.url, args.iterations);

    runner.check_health().await.map_err(|e| {
        anyhow::anyhow!("API server is not running ({}). Start it with `medsearch serve`.", e)
    })?;

    runner
        .run_benchmarks(&args.queries, &args.output, &args.submission)
        .await
}

/// Run one search directly against a catalog file and print the JSON response
fn execute_query(args: cli::QueryArgs) -> Result<()> {
    let mode: Mode = args.mode.parse().map_err(|e| anyhow::anyhow!("{}", e))?;

    let store = MemoryStore::load(&args.catalog)?;
    let engine = SearchEngine::new(store);

    let response = engine
        .search(mode, &args.query)
        .map_err(|e| anyhow::anyhow!(e.message()))?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Map errors to exit codes
fn get_exit_code(err: &anyhow::Error) -> i32 {
    let err_str = err.to_string().to_lowercase();

    if err_str.contains("invalid") || err_str.contains("unknown") {
        1 // invalid arguments or query
    } else if err_str.contains("connect") || err_str.contains("not running") {
        2 // network or API error
    } else if err_str.contains("not found") {
        3 // missing catalog or data files
    } else {
        5 // other application errors
    }
}
