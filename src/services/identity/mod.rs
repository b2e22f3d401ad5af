pub mod jwt;
pub mod provider;
pub mod session;

pub use jwt::JwtIdentityProvider;
pub use provider::{IdentityError, IdentityProvider, Principal};
