/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - identity provider, download authorizer, response policy
 * - Cheap to clone (Arc inside); collaborators are trait objects so tests can swap them
 */
use std::sync::Arc;

use crate::services::download::{DenialDisclosure, DownloadAuthorizer};
use crate::services::identity::IdentityProvider;

#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub downloads: Arc<DownloadAuthorizer>,
    pub download_denial: DenialDisclosure,
}

impl AppState {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        downloads: Arc<DownloadAuthorizer>,
        download_denial: DenialDisclosure,
    ) -> Self {
        Self {
            identity,
            downloads,
            download_denial,
        }
    }
}
