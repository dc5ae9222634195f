//! Crawl orchestration
//!
//! This module contains the crawl lifecycle: startup discovery, the worker
//! pool pulling from the frontier, per-item processing with expansion of
//! collections and hubs, and graceful shutdown that drains the persistence
//! sink before the process exits.

mod coordinator;
mod worker;

pub use coordinator::Coordinator;

use crate::config::CrawlConfig;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open (or create) the output directory, record store and index
/// 2. Pre-seed the scheduled-set when resuming
/// 3. Discover top-level candidates via two-level category enumeration
/// 4. Run the worker pool until the frontier is drained and idle
/// 5. Flush the sink and write the audit surfaces
pub async fn crawl(config: CrawlConfig) -> Result<()> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
