/*
 * Responsibility
 * - The request-scoped identity context handlers see
 * - The session middleware resolves it once and stores it in request extensions
 *
 * Notes
 * - Token verification lives in services::identity
 * - `principal` is None for anonymous requests; this type never rejects on its own
 */
use crate::services::access::{RoleResolution, resolve_role};
use crate::services::identity::Principal;

#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub principal: Option<Principal>,
}

impl AuthCtx {
    pub fn new(principal: Option<Principal>) -> Self {
        Self { principal }
    }

    pub fn role(&self) -> RoleResolution {
        resolve_role(self.principal.as_ref())
    }
}
