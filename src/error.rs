/// Error type returned by this crate.
///
/// There is no dedicated "retries exhausted" variant: once the retry budget
/// runs out, the last transient failure is surfaced exactly as it was seen.
#[derive(Debug, thiserror::Error)]
pub enum HairscanError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Response decoding or shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
    /// Request descriptor rejected before any network I/O.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Retry policy rejected before any network I/O.
    #[error("invalid retry policy: {0}")]
    InvalidPolicy(String),
}
