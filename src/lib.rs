//! Versecrawl: a structured poem corpus extractor for Wikisource
//!
//! This crate crawls a MediaWiki-based document collection, classifies pages
//! into semantic roles (poem, collection, multi-version hub, author, other),
//! and extracts a structured corpus of poems with author, collection and
//! section provenance.

pub mod classify;
pub mod config;
pub mod corpus;
pub mod crawler;
pub mod extract;
pub mod frontier;
pub mod gateway;
pub mod output;
pub mod sink;
pub mod wiki;

use thiserror::Error;

/// Main error type for versecrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] gateway::GatewayError),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Root category '{0}' not found and search fallback returned nothing")]
    RootCategoryMissing(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for versecrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use classify::{PageType, Signal};
pub use config::{CrawlConfig, Heuristics};
pub use corpus::{Collection, ExtractedPoem, WorkItem};
pub use frontier::Frontier;
