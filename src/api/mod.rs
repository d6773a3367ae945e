//! REST client for the bot backend.
//!
//! Every endpoint returns exactly HTTP 200 on success; any other status
//! code and any transport error are treated uniformly as failure. The
//! client never retries.

mod client;
pub mod types;

pub use client::ApiClient;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),
    #[error("invalid response body: {0}")]
    InvalidResponse(String),
}
