//! Error types for the remote catalogue adapter

use thiserror::Error;

/// Result type alias for remote operations
pub type Result<T> = std::result::Result<T, RemoteError>;

/// Errors that can occur while talking to the remote catalogue
///
/// The caching layer above treats `Unreachable`, `Http` and `Status` as
/// one transport family and `Parse` as the malformed-response family;
/// both mean "the remote fetch for this scope failed" and are never
/// retried here.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network reported unreachable by the connectivity policy
    #[error("network is not reachable")]
    Unreachable,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote service answered with a non-success status
    #[error("remote service returned status {0}")]
    Status(u16),

    /// Malformed remote response (HTML scraping failed)
    #[error("malformed remote response: {0}")]
    Parse(String),

    /// Regex error
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}
