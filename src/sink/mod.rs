//! Persistence sink
//!
//! A single-consumer durable writer, decoupled from the worker pool by a
//! bounded channel. The writer owns both output surfaces: the append-only
//! JSONL record store and the SQLite index. Inserts are keyed by page
//! identity with replace-on-conflict semantics, so the benign redirect race
//! (two workers deriving a record for the same page) resolves to
//! last-write-wins.

mod index;
mod writer;

pub use index::{CorpusStats, PoemIndex};
pub use writer::{PoemSink, SinkHandle};

use thiserror::Error;

/// Sink-specific errors
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink channel closed before shutdown")]
    ChannelClosed,

    #[error("Writer thread panicked")]
    WriterPanicked,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sink operations
pub type SinkResult<T> = std::result::Result<T, SinkError>;
