//! Error types shared across the bridge.

use thiserror::Error;

/// Failure to load the address to queue routing table.
///
/// Never fatal: the server keeps running with an empty table.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read routing table: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse routing table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The `mandrill_events` payload was not a JSON array of events.
#[derive(Debug, Error)]
#[error("could not decode mandrill events: {0}")]
pub struct DecodeError(#[from] pub serde_json::Error);

/// A single event could not be handed to the RT gateway.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The request never produced a response (connect, TLS, timeout).
    #[error("gateway transport error: {0}")]
    Transport(String),

    /// The gateway answered with a status above 299.
    #[error("gateway rejected message with status {status}")]
    Rejected { status: u16 },
}

impl From<reqwest::Error> for ForwardError {
    fn from(e: reqwest::Error) -> Self {
        ForwardError::Transport(e.to_string())
    }
}
