use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::Serialize;
use thiserror::Error;

use crate::services::access::Role;

/// The authenticated actor behind a request.
///
/// - `id` is the provider's opaque subject (never interpreted here)
/// - `role` is `None` when the token carries no recognised role claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub verified: bool,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Source of the current principal for a request.
///
/// Injected through `AppState` so handlers never reach for a global client.
/// Returns:
/// - `Ok(Some(_))` when the request carries a valid session
/// - `Ok(None)` when it carries none (or an invalid/expired one)
/// - `Err(_)` when the provider itself could not answer
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_principal(&self, headers: &HeaderMap)
    -> Result<Option<Principal>, IdentityError>;
}
