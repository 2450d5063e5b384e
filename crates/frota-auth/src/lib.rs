//! Credential and token handling for the Frota identity service.
//!
//! Leaf services ([`CredentialService`], [`TokenService`]) carry no state
//! beyond their configuration. [`Authenticator`], [`IdentityResolver`] and
//! [`AuthorizationGuard`] sit on top of any
//! [`PrincipalStore`](frota_core::store::PrincipalStore).

pub mod credential;
pub mod guard;
pub mod identity;
pub mod login;
pub mod token;

#[cfg(test)]
mod test_support;

pub use credential::CredentialService;
pub use guard::AuthorizationGuard;
pub use identity::{IdentityResolver, Principal};
pub use login::Authenticator;
pub use token::{Claims, Grant, TokenInvalid, TokenService};
