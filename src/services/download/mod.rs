pub mod authorizer;
pub mod error;

pub use authorizer::{DownloadAuthorizer, DownloadGrant};
pub use error::{DenialDisclosure, DownloadError};
