//! Crawl coordinator
//!
//! Wires the gateway, frontier, worker pool and sink together and manages
//! the lifecycle: resume pre-seeding, two-level category discovery, the
//! worker pool, and shutdown that flushes every already-enqueued record
//! before returning.

use crate::config::CrawlConfig;
use crate::corpus::WorkItem;
use crate::crawler::worker::{worker_loop, WorkerContext};
use crate::frontier::Frontier;
use crate::gateway::{PageRef, WikiClient};
use crate::output::{print_run_summary, AuditLog, RunStats, TreeLogger};
use crate::sink::{PoemIndex, PoemSink};
use crate::wiki;
use crate::{CrawlError, Result};
use std::sync::Arc;

/// Main crawl coordinator
pub struct Coordinator {
    config: Arc<CrawlConfig>,
    client: Arc<WikiClient>,
    frontier: Arc<Frontier>,
    stats: Arc<RunStats>,
}

impl Coordinator {
    /// Creates a coordinator for the given configuration
    pub fn new(config: CrawlConfig) -> Result<Self> {
        crate::config::validate(&config)?;

        let client = WikiClient::new(
            &config.api_endpoint(),
            config.workers,
            &config.heuristics,
        )?;

        Ok(Self {
            config: Arc::new(config),
            client: Arc::new(client),
            frontier: Arc::new(Frontier::new()),
            stats: Arc::new(RunStats::new()),
        })
    }

    /// Creates a coordinator against an explicit API endpoint (for tests)
    pub fn with_endpoint(config: CrawlConfig, endpoint: &str) -> Result<Self> {
        crate::config::validate(&config)?;

        let client = WikiClient::new(endpoint, config.workers, &config.heuristics)?;

        Ok(Self {
            config: Arc::new(config),
            client: Arc::new(client),
            frontier: Arc::new(Frontier::new()),
            stats: Arc::new(RunStats::new()),
        })
    }

    /// Runs the full crawl lifecycle
    pub async fn run(&self) -> Result<()> {
        let start = std::time::Instant::now();
        std::fs::create_dir_all(&self.config.output_dir)?;

        let index = PoemIndex::open(&self.config.index_path())?;
        if self.config.resume {
            let processed = index.processed_ids()?;
            tracing::info!(
                "Resume mode: pre-seeding {} already processed page ids",
                processed.len()
            );
            self.frontier.preseed(processed);
        }

        let sink = PoemSink::spawn(&self.config.records_path(), index, &self.config.heuristics)?;
        let audit = Arc::new(AuditLog::create(&self.config.logs_dir())?);
        let tree = self
            .config
            .tree_log
            .then(|| Arc::new(TreeLogger::new()));

        let ctx = WorkerContext {
            config: self.config.clone(),
            client: self.client.clone(),
            frontier: self.frontier.clone(),
            sink: sink.handle(),
            stats: self.stats.clone(),
            audit: audit.clone(),
            tree: tree.clone(),
        };

        // Workers start first so discovery streams into a live pool
        let mut workers = Vec::with_capacity(self.config.workers);
        for worker_id in 0..self.config.workers {
            workers.push(tokio::spawn(worker_loop(ctx.clone(), worker_id)));
        }

        let discovery = self.discover().await;
        match &discovery {
            Ok(seeded) => tracing::info!("Discovery finished, {} initial pages enqueued", seeded),
            Err(e) => tracing::error!("Discovery failed, draining workers before aborting: {}", e),
        }
        self.frontier.close_when_idle();

        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!("Worker task aborted: {}", e);
            }
        }

        audit.flush();
        if let Some(tree) = tree {
            tree.write_log_files(&self.config.logs_dir().join("tree-logs"))?;
        }

        // Join the writer off the async runtime; it flushes everything
        // already enqueued before returning
        let written = tokio::task::spawn_blocking(move || sink.shutdown())
            .await
            .map_err(|_| crate::sink::SinkError::WriterPanicked)??;

        // A fatal discovery error (missing root) aborts only after the sink
        // has flushed whatever was already processed
        discovery?;

        print_run_summary(&self.stats, written, start.elapsed());
        Ok(())
    }

    /// Resolves the root category, tolerating an inexact name
    ///
    /// A missing root aborts the whole run: there is no partial-crawl
    /// fallback without it.
    async fn resolve_root_category(&self) -> Result<String> {
        let prefix = wiki::category_prefix(&self.config.lang);
        let full_title = format!("{}:{}", prefix, self.config.category);

        let batch = self.client.resolve_titles(&[full_title.clone()]).await?;
        if batch.resolve(&full_title).is_some() {
            return Ok(full_title);
        }

        tracing::warn!("Category '{}' not found. Attempting search...", full_title);
        match self.client.search_category(&full_title).await? {
            Some(corrected) => {
                tracing::info!("Found likely match: '{}'. Using this title.", corrected);
                Ok(corrected)
            }
            None => Err(CrawlError::RootCategoryMissing(self.config.category.clone())),
        }
    }

    /// Filters subcategories down to the ones reporting members, checking in
    /// API-sized batches
    async fn non_empty_subcategories(&self, root_short: &str) -> Result<Vec<String>> {
        let subcategories = self
            .client
            .list_subcategories(root_short, &self.config.lang)
            .await?;
        tracing::info!(
            "Found {} potential author categories. Checking which are non-empty...",
            subcategories.len()
        );

        let titles: Vec<String> = subcategories.into_iter().map(|c| c.title).collect();
        let mut non_empty = Vec::new();

        for chunk in titles.chunks(self.config.heuristics.title_batch_size) {
            let counts = self.client.get_category_counts(chunk).await?;
            for title in chunk {
                if counts.get(title).map(|c| !c.is_empty()).unwrap_or(false) {
                    non_empty.push(title.clone());
                }
            }
        }

        Ok(non_empty)
    }

    /// Two-level discovery: root category -> non-empty author subcategories
    /// -> member pages, each submitted with its subcategory as parent and
    /// group key
    async fn discover(&self) -> Result<usize> {
        tracing::info!(
            "Normalizing root category title '{}'...",
            self.config.category
        );
        let root_title = self.resolve_root_category().await?;
        let root_short = root_title
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or(&root_title)
            .to_string();

        tracing::info!("Phase 1: discovering author subcategories in '{}'", root_title);
        let author_categories = self.non_empty_subcategories(&root_short).await?;
        tracing::info!(
            "Found {} non-empty author categories. Discovering pages...",
            author_categories.len()
        );

        let mut enqueued = 0usize;

        'discovery: for author_category in &author_categories {
            let short = author_category
                .split_once(':')
                .map(|(_, rest)| rest)
                .unwrap_or(author_category);

            let members = match self
                .client
                .list_category_pages(short, &self.config.lang)
                .await
            {
                Ok(members) => members,
                Err(e) => {
                    tracing::warn!(
                        "Failed to enumerate '{}', skipping category: {}",
                        author_category,
                        e
                    );
                    continue;
                }
            };

            for member in members {
                if let Some(limit) = self.config.limit {
                    if enqueued >= limit {
                        tracing::info!("Item cap of {} reached, stopping discovery", limit);
                        break 'discovery;
                    }
                }

                let item = WorkItem::seed(
                    PageRef {
                        page_id: member.page_id,
                        title: member.title,
                        ns: 0,
                    },
                    author_category.clone(),
                    author_category.clone(),
                );
                if self.frontier.submit_if_new(item) {
                    enqueued += 1;
                }
            }
        }

        Ok(enqueued)
    }

    /// `--dry-run`: resolves the root and lists what would be crawled,
    /// without fetching any member page content
    pub async fn dry_run(&self) -> Result<()> {
        println!("=== Versecrawl Dry Run ===\n");
        println!("Endpoint: {}", self.config.api_endpoint());
        println!("Root category: {}", self.config.category);

        let root_title = self.resolve_root_category().await?;
        let root_short = root_title
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or(&root_title)
            .to_string();
        println!("Resolved root: {}", root_title);

        let author_categories = self.non_empty_subcategories(&root_short).await?;
        println!(
            "\nNon-empty author categories ({}):",
            author_categories.len()
        );
        for category in &author_categories {
            println!("  - {}", category);
        }

        println!("\n✓ Configuration is valid");
        println!(
            "✓ Would crawl member pages of {} categories with {} workers",
            author_categories.len(),
            self.config.workers
        );
        Ok(())
    }
}
