use serde::Deserialize;
use std::path::PathBuf;

/// Runtime configuration for a crawl run
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Language code of the Wikisource project to target (e.g. "fr", "en")
    pub lang: String,

    /// Root category to start discovery from (without the namespace prefix)
    pub category: String,

    /// Number of concurrent worker tasks; also sets the Gateway permit count
    pub workers: usize,

    /// Optional cap on the number of top-level pages enqueued by discovery
    pub limit: Option<usize>,

    /// Pre-seed the scheduled-set from a previous run's index
    pub resume: bool,

    /// Write per-author exploration tree logs at the end of the run
    pub tree_log: bool,

    /// Directory receiving the record store, index and logs
    pub output_dir: PathBuf,

    /// Tuned classification/extraction thresholds
    pub heuristics: Heuristics,
}

impl CrawlConfig {
    /// The MediaWiki API endpoint for the configured language
    pub fn api_endpoint(&self) -> String {
        format!("https://{}.wikisource.org/w/api.php", self.lang)
    }

    /// Path of the append-only JSONL record store
    pub fn records_path(&self) -> PathBuf {
        self.output_dir.join("poems.jsonl")
    }

    /// Path of the SQLite poem index
    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join("poems_index.sqlite")
    }

    /// Directory receiving audit CSVs and tree logs
    pub fn logs_dir(&self) -> PathBuf {
        self.output_dir.join("logs")
    }
}

/// Empirically tuned thresholds used by the classifier, extractor, gateway
/// and sink.
///
/// These are magic numbers by nature; they are named here (rather than
/// inlined at use sites) so they can be retuned from a TOML file without
/// touching control flow.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Heuristics {
    /// Fraction of list items that must carry an internal link before a page
    /// reads as a table of contents
    pub link_ratio_threshold: f64,

    /// Minimum absolute number of internal list links for the ratio signal
    /// to apply
    pub min_list_links: usize,

    /// Headings/bold runs longer than this are not section titles
    pub max_section_title_chars: usize,

    /// A "/"-delimited title parent segment longer than this is not treated
    /// as a collection name
    pub max_collection_segment_chars: usize,

    /// Titles per batch when resolving child links (API batch query limit)
    pub title_batch_size: usize,

    /// Total attempts per Gateway call before degrading to a typed failure
    pub max_fetch_attempts: u32,

    /// Base delay for exponential retry backoff (doubles per attempt)
    pub retry_base_delay_ms: u64,

    /// Wikitext #REDIRECT hops followed before declaring a redirect loop
    pub max_redirect_hops: u32,

    /// Bounded channel capacity between workers and the persistence sink
    pub sink_capacity: usize,

    /// Cooperative backoff between non-blocking sink send attempts
    pub sink_retry_delay_ms: u64,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            link_ratio_threshold: 0.70,
            min_list_links: 3,
            max_section_title_chars: 150,
            max_collection_segment_chars: 70,
            title_batch_size: 50,
            max_fetch_attempts: 4,
            retry_base_delay_ms: 500,
            max_redirect_hops: 3,
            sink_capacity: 32,
            sink_retry_delay_ms: 25,
        }
    }
}
