use thiserror::Error;

/// Failure of a single check, rendered into [`crate::CheckResult::error_details`]
#[derive(Debug, Error)]
pub enum CheckError {
    /// Target could not be turned into a URL with a host
    #[error("invalid URL {0}: {1}")]
    InvalidUrl(String, String),
    /// DNS, TCP, timeout or any other transport failure
    #[error("HTTP connection failed: {0}")]
    Connection(String),
    /// Server certificate was rejected during the TLS handshake
    #[error("TLS certificate verification failed: {0}")]
    TlsVerification(String),
    /// Server answered with a status code of 400 or above
    #[error("bad HTTP status code: {0}")]
    BadStatus(u16),
}
