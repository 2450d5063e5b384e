//! Bearer token to principal resolution.

use std::sync::Arc;

use frota_core::{
  Domain, Error, Result,
  principal::{Employee, EmployeeId, Person, PersonId},
  store::{PrincipalStore, StoreResultExt},
};

use crate::token::TokenService;

/// An authenticated caller from either domain.
#[derive(Debug, Clone)]
pub enum Principal {
  Employee(Employee),
  Person(Person),
}

impl Principal {
  /// Decimal id, as carried in the token subject.
  pub fn subject(&self) -> String {
    match self {
      Self::Employee(e) => e.id.to_string(),
      Self::Person(p) => p.id.to_string(),
    }
  }

  pub(crate) fn password_hash(&self) -> &str {
    match self {
      Self::Employee(e) => &e.password_hash,
      Self::Person(p) => &p.password_hash,
    }
  }
}

/// Turns a bearer token into the principal it names.
///
/// Resolution runs decode, domain check, subject parse, load and, for
/// employees only, an activation check. Every failure reports
/// [`Error::TokenInvalid`] for the requested domain, except an employee who
/// exists but is inactive, which reports [`Error::EmployeeInactive`]. Store
/// failures pass through unchanged.
#[derive(Debug)]
pub struct IdentityResolver<S> {
  store:  Arc<S>,
  tokens: Arc<TokenService>,
}

impl<S> Clone for IdentityResolver<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      tokens: Arc::clone(&self.tokens),
    }
  }
}

impl<S> IdentityResolver<S>
where
  S: PrincipalStore,
{
  pub fn new(store: Arc<S>, tokens: Arc<TokenService>) -> Self { Self { store, tokens } }

  pub async fn resolve(&self, domain: Domain, token: &str) -> Result<Principal> {
    match domain {
      Domain::Employee => self.resolve_employee(token).await.map(Principal::Employee),
      Domain::Person => self.resolve_person(token).await.map(Principal::Person),
    }
  }

  /// Decode the token and return its subject, provided it was issued for
  /// `domain`.
  fn subject(&self, domain: Domain, token: &str) -> Result<String> {
    let claims = self.tokens.verify(token).map_err(|_| Error::TokenInvalid(domain))?;
    if claims.grant.dom != domain {
      tracing::debug!(expected = %domain, found = %claims.grant.dom, "token issued for other domain");
      return Err(Error::TokenInvalid(domain));
    }
    Ok(claims.grant.sub)
  }

  pub async fn resolve_employee(&self, token: &str) -> Result<Employee> {
    let invalid = || Error::TokenInvalid(Domain::Employee);
    let sub = self.subject(Domain::Employee, token)?;
    let id: EmployeeId = sub.parse().map_err(|_| {
      tracing::debug!(%sub, "employee token subject is not an id");
      invalid()
    })?;

    let Some(employee) = self.store.employee_by_id(id).await.into_core()? else {
      tracing::debug!(employee = %id, "employee token for unknown subject");
      return Err(invalid());
    };
    if !employee.is_active {
      tracing::info!(employee = %id, "token presented by inactive employee");
      return Err(Error::EmployeeInactive);
    }
    Ok(employee)
  }

  pub async fn resolve_person(&self, token: &str) -> Result<Person> {
    let invalid = || Error::TokenInvalid(Domain::Person);
    let sub = self.subject(Domain::Person, token)?;
    let id: PersonId = sub.parse().map_err(|_| {
      tracing::debug!(%sub, "person token subject is not an id");
      invalid()
    })?;

    // Blocking is enforced at login; a token issued before the block stays
    // usable until it expires.
    self.store.person_by_id(id).await.into_core()?.ok_or_else(|| {
      tracing::debug!(person = %id, "person token for unknown subject");
      invalid()
    })
  }
}
