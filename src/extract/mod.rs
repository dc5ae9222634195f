//! Content extraction for pages classified as poems
//!
//! Turns a rendered page into an [`ExtractedPoem`](crate::corpus::ExtractedPoem)
//! or fails with a recoverable "not actually parseable" signal, distinct from
//! a page-fetch failure: a page can carry verse-like markup and still yield
//! nothing usable.

mod extractor;
mod metadata;
mod structure;

pub use extractor::extract;
pub use metadata::extract_metadata;
pub use structure::extract_poem_structure;

use thiserror::Error;

/// Extraction-specific errors, all recoverable at item granularity
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("No verse structure found in rendered markup")]
    NoVerseStructure,

    #[error("Verse blocks present but every stanza is empty")]
    EmptyStructure,
}

/// Result type alias for extraction operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
