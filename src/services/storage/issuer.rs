//! Signed-URL issuer interface used by the download authorizer.
use async_trait::async_trait;
use thiserror::Error;

/// Storage-layer errors.
///
/// Kept independent from `AppError`; the download handler maps every variant to
/// the same generic 500 so nothing about the storage layout leaks to clients.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object path: {0}")]
    InvalidPath(String),
    #[error("failed to sign url: {0}")]
    Signing(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait SignedUrlIssuer: Send + Sync {
    /// Create a URL granting read access to `path` for `expires_in_secs` seconds.
    async fn create_signed_url(
        &self,
        path: &str,
        expires_in_secs: u64,
    ) -> Result<String, StorageError>;
}
