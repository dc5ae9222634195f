//! Remote content gateway
//!
//! All traffic to the MediaWiki API flows through this module: permit-bounded
//! concurrency, bounded retry with exponential backoff for transient
//! failures, and typed accessors over the API's JSON envelopes. Every
//! operation is an idempotent read; "not found" surfaces as `Ok(None)` or an
//! empty result, never as an error.

mod client;
mod types;

pub use client::WikiClient;
pub use types::{CategoryCounts, CategoryMember, PageData, PageRef, Redirect, ResolvedBatch};

use thiserror::Error;

/// Gateway-specific errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {status} from API")]
    Status { status: u16 },

    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Malformed API response: {0}")]
    Malformed(String),
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
