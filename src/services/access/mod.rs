pub mod area;
pub mod resolver;
pub mod role;

pub use area::{GuardDecision, LOGIN_PATH, ProtectedArea, guard, home_of};
pub use resolver::{RoleResolution, resolve_role};
pub use role::Role;
