//! Versecrawl main entry point
//!
//! Command-line interface for the Wikisource poem corpus crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use versecrawl::config::{load_heuristics_with_hash, CrawlConfig, Heuristics};
use versecrawl::crawler::Coordinator;
use versecrawl::output::print_corpus_stats;
use versecrawl::sink::PoemIndex;

/// Versecrawl: a structured poem corpus extractor for Wikisource
///
/// Crawls a Wikisource category tree, classifies pages into semantic roles
/// and extracts poems with author, collection and section provenance into an
/// append-only JSONL store plus a SQLite index.
#[derive(Parser, Debug)]
#[command(name = "versecrawl")]
#[command(version = "1.0.0")]
#[command(about = "A structured poem corpus extractor for Wikisource", long_about = None)]
struct Cli {
    /// Language code of the Wikisource project to target (e.g. 'fr', 'en')
    #[arg(long)]
    lang: String,

    /// Root category to crawl (e.g. 'Poèmes', 'Poetry')
    #[arg(long)]
    category: String,

    /// Number of concurrent workers (also the API permit count)
    #[arg(long, default_value_t = 10)]
    workers: usize,

    /// Cap the number of top-level pages enqueued (useful for testing)
    #[arg(long)]
    limit: Option<usize>,

    /// Resume mode: skip page ids already present in the index
    #[arg(long)]
    resume: bool,

    /// Directory for the record store, index and logs
    #[arg(long, default_value = "./data")]
    output_dir: PathBuf,

    /// Optional TOML file overriding heuristic thresholds
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Write per-author exploration tree logs at the end of the run
    #[arg(long)]
    tree_log: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resolve the root and list what would be crawled, fetching no pages
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from an existing index and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let heuristics = match &cli.tuning {
        Some(path) => {
            let (heuristics, hash) = load_heuristics_with_hash(path)
                .with_context(|| format!("failed to load tuning file {}", path.display()))?;
            tracing::info!("Loaded heuristics tuning from {} (hash: {})", path.display(), hash);
            heuristics
        }
        None => Heuristics::default(),
    };

    let config = CrawlConfig {
        lang: cli.lang,
        category: cli.category,
        workers: cli.workers,
        limit: cli.limit,
        resume: cli.resume,
        tree_log: cli.tree_log,
        output_dir: cli.output_dir,
        heuristics,
    };

    if cli.stats {
        return handle_stats(&config);
    }

    if cli.dry_run {
        let coordinator = Coordinator::new(config)?;
        coordinator.dry_run().await?;
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("versecrawl=info,warn"),
            1 => EnvFilter::new("versecrawl=debug,info"),
            2 => EnvFilter::new("versecrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --stats mode: reads the index and prints corpus counts
fn handle_stats(config: &CrawlConfig) -> anyhow::Result<()> {
    let index_path = config.index_path();
    println!("Index: {}\n", index_path.display());

    let index = PoemIndex::open(&index_path)
        .with_context(|| format!("failed to open index at {}", index_path.display()))?;
    let stats = index.corpus_stats()?;
    print_corpus_stats(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: CrawlConfig) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawler for '{}.wikisource.org', root category '{}'",
        config.lang,
        config.category
    );
    if config.resume {
        tracing::info!("Resume mode enabled: previously indexed pages will be skipped");
    }
    tracing::info!(
        "Workers: {}, limit: {:?}, output: {}",
        config.workers,
        config.limit,
        config.output_dir.display()
    );

    match versecrawl::crawler::crawl(config).await {
        Ok(()) => {
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
