use thiserror::Error;

/// Errors surfaced to evaluation callers. Absence of a key is deliberately
/// distinct from a flag that exists and evaluates to `false`, so callers can
/// substitute their own default.
#[derive(Error, Debug)]
pub enum FlagsError {
    #[error("unknown key: {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to decode server payload: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SyncError {
    /// Bootstrap is the one fetch that must succeed; the engine is unusable
    /// until the caller retries it.
    #[error("bootstrap fetch failed: {0}")]
    Bootstrap(#[source] TransportError),
}
