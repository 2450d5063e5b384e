//! Role checks layered on identity resolution.
//!
//! The predicates are plain functions so handlers that already hold a
//! principal can apply them without touching the store again.

use frota_core::{
  Error, Result,
  principal::{Employee, Person, PersonKind},
  store::PrincipalStore,
};

use crate::identity::IdentityResolver;

pub fn require_active(employee: &Employee) -> Result<()> {
  if employee.is_active { Ok(()) } else { Err(Error::EmployeeInactive) }
}

pub fn require_admin(employee: &Employee) -> Result<()> {
  require_active(employee)?;
  if employee.is_admin {
    Ok(())
  } else {
    tracing::info!(employee = %employee.id, "admin-only operation refused");
    Err(Error::InsufficientRole("administrator privileges required"))
  }
}

pub fn require_organization(person: &Person) -> Result<()> {
  match person.kind() {
    PersonKind::Organizational => Ok(()),
    PersonKind::Individual => Err(Error::InsufficientRole("organizational account required")),
  }
}

/// Resolves a bearer token and applies one of the role predicates.
#[derive(Debug)]
pub struct AuthorizationGuard<S> {
  resolver: IdentityResolver<S>,
}

impl<S> Clone for AuthorizationGuard<S> {
  fn clone(&self) -> Self { Self { resolver: self.resolver.clone() } }
}

impl<S> AuthorizationGuard<S>
where
  S: PrincipalStore,
{
  pub fn new(resolver: IdentityResolver<S>) -> Self { Self { resolver } }

  pub async fn active_employee(&self, token: &str) -> Result<Employee> {
    let employee = self.resolver.resolve_employee(token).await?;
    require_active(&employee)?;
    Ok(employee)
  }

  pub async fn admin(&self, token: &str) -> Result<Employee> {
    let employee = self.resolver.resolve_employee(token).await?;
    require_admin(&employee)?;
    Ok(employee)
  }

  /// Any person of either sub-type.
  pub async fn person(&self, token: &str) -> Result<Person> {
    self.resolver.resolve_person(token).await
  }

  pub async fn organization(&self, token: &str) -> Result<Person> {
    let person = self.resolver.resolve_person(token).await?;
    require_organization(&person)?;
    Ok(person)
  }
}
