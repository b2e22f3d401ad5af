//! Role resolution: principal (or none) -> routing role.

use super::role::Role;
use crate::services::identity::Principal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleResolution {
    Unauthenticated,
    Authenticated(Role),
}

/// A principal without a role claim routes as unauthenticated even though a session exists.
pub fn resolve_role(principal: Option<&Principal>) -> RoleResolution {
    match principal.and_then(|p| p.role) {
        Some(role) => RoleResolution::Authenticated(role),
        None => RoleResolution::Unauthenticated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::principal;

    #[test]
    fn no_principal_is_unauthenticated() {
        assert_eq!(resolve_role(None), RoleResolution::Unauthenticated);
    }

    #[test]
    fn principal_without_role_claim_is_unauthenticated() {
        let p = principal("u1", None);
        assert_eq!(resolve_role(Some(&p)), RoleResolution::Unauthenticated);
    }

    #[test]
    fn role_claim_is_used_as_is() {
        let p = principal("u1", Some(Role::Artist));
        assert_eq!(resolve_role(Some(&p)), RoleResolution::Authenticated(Role::Artist));
    }
}
