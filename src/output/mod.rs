//! Output module: audit logs, run statistics and exploration trees
//!
//! Everything here exists so an operator can distinguish "correctly pruned"
//! from "missed content" after a run: per-category CSV audit logs record
//! every non-leaf page's classification reason and child count, the stats
//! report summarizes the corpus, and the optional tree logs show the full
//! exploration hierarchy per author.

mod audit;
mod stats;
mod tree;

pub use audit::AuditLog;
pub use stats::{print_corpus_stats, print_run_summary, RunStats};
pub use tree::TreeLogger;
