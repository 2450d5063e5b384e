//! Email and password login for both domains.

use std::sync::Arc;

use chrono::Duration;
use frota_core::{Domain, Error, Result, store::{PrincipalStore, StoreResultExt}};

use crate::{
  credential::CredentialService,
  identity::Principal,
  token::{Grant, TokenService},
};

/// Verifies login attempts against the store.
#[derive(Debug)]
pub struct Authenticator<S> {
  store:       Arc<S>,
  credentials: Arc<CredentialService>,
}

impl<S> Clone for Authenticator<S> {
  fn clone(&self) -> Self {
    Self {
      store:       Arc::clone(&self.store),
      credentials: Arc::clone(&self.credentials),
    }
  }
}

impl<S> Authenticator<S>
where
  S: PrincipalStore,
{
  pub fn new(store: Arc<S>, credentials: Arc<CredentialService>) -> Self {
    Self { store, credentials }
  }

  /// Look up `email` in `domain` and check `password` against its hash.
  ///
  /// Unknown email and wrong password produce the same
  /// [`Error::InvalidCredentials`]. A blocked person is refused with
  /// [`Error::AccountBlocked`] before the password is looked at.
  pub async fn authenticate(&self, domain: Domain, email: &str, password: &str) -> Result<Principal> {
    let principal = match domain {
      Domain::Employee => self
        .store
        .employee_by_email(email)
        .await
        .into_core()?
        .map(Principal::Employee),
      Domain::Person => self
        .store
        .person_by_email(email)
        .await
        .into_core()?
        .map(Principal::Person),
    };

    let Some(principal) = principal else {
      tracing::warn!(%domain, "login for unknown email");
      return Err(Error::InvalidCredentials(domain));
    };

    if let Principal::Person(person) = &principal {
      if !person.is_active {
        tracing::warn!(person = %person.id, "login refused for blocked person");
        return Err(Error::AccountBlocked);
      }
    }

    if !self.credentials.verify(password, principal.password_hash()) {
      tracing::warn!(%domain, subject = %principal.subject(), "login with wrong password");
      return Err(Error::InvalidCredentials(domain));
    }

    tracing::info!(%domain, subject = %principal.subject(), "login succeeded");
    Ok(principal)
  }

  /// [`authenticate`](Self::authenticate), then sign a token for the
  /// principal valid for `ttl`.
  pub async fn login(
    &self,
    tokens: &TokenService,
    domain: Domain,
    email: &str,
    password: &str,
    ttl: Duration,
  ) -> Result<String> {
    let principal = self.authenticate(domain, email, password).await?;
    tokens.issue(principal.grant(), ttl)
  }
}

impl Principal {
  /// Claims to put in a token for this principal. Employee tokens carry only
  /// the subject; person tokens also carry the email and sub-type.
  pub fn grant(&self) -> Grant {
    match self {
      Self::Employee(employee) => Grant {
        sub:   employee.id.to_string(),
        dom:   Domain::Employee,
        email: None,
        kind:  None,
      },
      Self::Person(person) => Grant {
        sub:   person.id.to_string(),
        dom:   Domain::Person,
        email: Some(person.email.clone()),
        kind:  Some(person.kind()),
      },
    }
  }
}
