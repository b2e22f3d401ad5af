//! Protected areas and the route guard decision.
//!
//! Policy:
//! - admin area: admin only
//! - editor area: editor or admin (admins may enter, editors may not enter the admin area)
//! - artist area: artist only
//! - customer area: customer only
//!
//! Every role has exactly one home area, and every role is allowed into its own home.
//! `/login` carries no role requirement, so an unauthenticated redirect always lands.

use serde::Serialize;

use super::resolver::RoleResolution;
use super::role::Role;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectedArea {
    Admin,
    Editor,
    Artist,
    Customer,
}

impl ProtectedArea {
    pub const ALL: [ProtectedArea; 4] = [
        ProtectedArea::Admin,
        ProtectedArea::Editor,
        ProtectedArea::Artist,
        ProtectedArea::Customer,
    ];

    /// URL prefix the area is mounted under.
    pub fn path(&self) -> &'static str {
        match self {
            ProtectedArea::Admin => "/admin",
            ProtectedArea::Editor => "/editor",
            ProtectedArea::Artist => "/artist",
            ProtectedArea::Customer => "/account",
        }
    }

    pub fn permitted_roles(&self) -> &'static [Role] {
        match self {
            ProtectedArea::Admin => &[Role::Admin],
            ProtectedArea::Editor => &[Role::Editor, Role::Admin],
            ProtectedArea::Artist => &[Role::Artist],
            ProtectedArea::Customer => &[Role::Customer],
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.permitted_roles().contains(&role)
    }
}

/// Home area for each role. Exhaustive on purpose: adding a role without a home fails to compile.
pub fn home_of(role: Role) -> ProtectedArea {
    match role {
        Role::Admin => ProtectedArea::Admin,
        Role::Editor => ProtectedArea::Editor,
        Role::Artist => ProtectedArea::Artist,
        Role::Customer => ProtectedArea::Customer,
    }
}

/// Where a rejected request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Login,
    Area(ProtectedArea),
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Login => LOGIN_PATH,
            Destination::Area(area) => area.path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Destination),
}

pub fn guard(area: ProtectedArea, resolution: RoleResolution) -> GuardDecision {
    match resolution {
        RoleResolution::Unauthenticated => GuardDecision::Redirect(Destination::Login),
        RoleResolution::Authenticated(role) if area.permits(role) => GuardDecision::Allow,
        RoleResolution::Authenticated(role) => {
            GuardDecision::Redirect(Destination::Area(home_of(role)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authed(role: Role) -> RoleResolution {
        RoleResolution::Authenticated(role)
    }

    #[test]
    fn unauthenticated_is_sent_to_login_from_every_area() {
        for area in ProtectedArea::ALL {
            assert_eq!(
                guard(area, RoleResolution::Unauthenticated),
                GuardDecision::Redirect(Destination::Login)
            );
        }
    }

    #[test]
    fn allow_iff_role_is_permitted() {
        for area in ProtectedArea::ALL {
            for role in Role::ALL {
                let expected_allow = match area {
                    ProtectedArea::Editor => matches!(role, Role::Editor | Role::Admin),
                    ProtectedArea::Admin => role == Role::Admin,
                    ProtectedArea::Artist => role == Role::Artist,
                    ProtectedArea::Customer => role == Role::Customer,
                };
                let decision = guard(area, authed(role));
                assert_eq!(
                    decision == GuardDecision::Allow,
                    expected_allow,
                    "area={area:?} role={role:?}"
                );
            }
        }
    }

    #[test]
    fn admin_may_enter_editor_area_but_editor_may_not_enter_admin_area() {
        assert_eq!(guard(ProtectedArea::Editor, authed(Role::Admin)), GuardDecision::Allow);
        assert_eq!(
            guard(ProtectedArea::Admin, authed(Role::Editor)),
            GuardDecision::Redirect(Destination::Area(ProtectedArea::Editor))
        );
    }

    #[test]
    fn rejected_roles_are_sent_home() {
        assert_eq!(
            guard(ProtectedArea::Admin, authed(Role::Customer)),
            GuardDecision::Redirect(Destination::Area(ProtectedArea::Customer))
        );
        assert_eq!(
            guard(ProtectedArea::Customer, authed(Role::Artist)),
            GuardDecision::Redirect(Destination::Area(ProtectedArea::Artist))
        );
    }

    #[test]
    fn every_role_is_allowed_into_its_own_home() {
        for role in Role::ALL {
            assert_eq!(guard(home_of(role), authed(role)), GuardDecision::Allow, "{role:?}");
        }
    }

    #[test]
    fn redirect_targets_are_never_protected_by_the_caller_role() {
        // Following a redirect once must land somewhere that allows the caller.
        for area in ProtectedArea::ALL {
            for role in Role::ALL {
                if let GuardDecision::Redirect(Destination::Area(target)) = guard(area, authed(role)) {
                    assert_eq!(guard(target, authed(role)), GuardDecision::Allow);
                }
            }
        }
        assert!(ProtectedArea::ALL.iter().all(|a| a.path() != LOGIN_PATH));
    }
}
