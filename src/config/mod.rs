//! Configuration module
//!
//! Runtime options come from the command line; the empirically tuned
//! heuristic thresholds live in [`Heuristics`] and can be overridden from an
//! optional TOML tuning file.

mod parser;
mod types;
mod validation;

pub use parser::{compute_tuning_hash, load_heuristics, load_heuristics_with_hash};
pub use types::{CrawlConfig, Heuristics};
pub use validation::validate;
