use thiserror::Error;

/// Failure modes of one API call. Transport and application errors are
/// surfaced to the user identically; the distinction exists for diagnostics.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server reported an error: {0}")]
    Api(String),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}
