//! The `PrincipalStore` trait.
//!
//! Implemented by storage backends (e.g. `frota-store-sqlite`). The auth and
//! transport layers depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  principal::{
    Employee, EmployeeId, EmployeeUpdate, NewEmployee, NewPerson, Person, PersonId, PersonKind,
    PersonUpdate,
  },
  relationship::DriverLink,
};

/// Abstraction over the transactional store holding both principal domains.
///
/// Email lookups are scoped: `employee_by_email` and `person_by_email` search
/// two independent uniqueness scopes. Every mutating method is atomic; the
/// association methods run their read-check-write sequence in a single
/// transaction using the rules in [`crate::relationship`].
///
/// Domain failures (duplicate email, missing principal, association
/// conflicts) must convert into the matching [`crate::Error`] variant.
pub trait PrincipalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Employees ─────────────────────────────────────────────────────────

  /// Persist a new employee. Fails with `DuplicateEmail` if the email is
  /// taken within the employee domain.
  fn insert_employee(
    &self,
    input: NewEmployee,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  fn employee_by_id(
    &self,
    id: EmployeeId,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + '_;

  fn employee_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + 'a;

  fn list_employees(&self)
  -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send + '_;

  /// Apply an admin update. Fails with `NotFound` for an unknown id.
  fn update_employee(
    &self,
    id: EmployeeId,
    update: EmployeeUpdate,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Persist a person with its address and, for organizations, its initial
  /// drivers. Either everything is written or nothing is.
  fn insert_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  fn person_by_id(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  fn person_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// List persons, optionally restricted to one sub-type, ordered by id.
  fn list_persons(
    &self,
    kind: Option<PersonKind>,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Replace a person's data. Fails with `NotFound` when the id is unknown
  /// or belongs to the other sub-type.
  fn update_person(
    &self,
    id: PersonId,
    update: PersonUpdate,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Block or unblock a person's logins.
  fn set_person_active(
    &self,
    id: PersonId,
    active: bool,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Delete a person together with its address and every association it
  /// holds or grants.
  fn delete_person(&self, id: PersonId)
  -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Driver associations ───────────────────────────────────────────────

  /// Make `individual` a driver of `organization`. Idempotent for the same
  /// pair.
  fn associate_driver(
    &self,
    organization: PersonId,
    individual: PersonId,
  ) -> impl Future<Output = Result<DriverLink, Self::Error>> + Send + '_;

  /// Release `individual` from `organization`.
  fn remove_driver(
    &self,
    organization: PersonId,
    individual: PersonId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The individuals currently driving for `organization`.
  fn drivers_of(
    &self,
    organization: PersonId,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;
}

/// Lifts a backend result into the shared [`crate::Error`] taxonomy.
pub trait StoreResultExt<T> {
  fn into_core(self) -> crate::Result<T>;
}

impl<T, E> StoreResultExt<T> for Result<T, E>
where
  E: Into<crate::Error>,
{
  fn into_core(self) -> crate::Result<T> { self.map_err(Into::into) }
}
