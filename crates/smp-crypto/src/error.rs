//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors raised by the crypto primitives.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The certificate could not be decoded or parsed.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// Reading a certificate from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
