pub mod issuer;
pub mod signer;

pub use issuer::{SignedUrlIssuer, StorageError};
pub use signer::StorageUrlSigner;
