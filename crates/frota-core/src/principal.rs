//! Principals of the two identity domains and the data they own.
//!
//! Employees are flat records with two capability flags. Persons are a closed
//! sum over two sub-types; shared attributes live on [`Person`] and the
//! sub-type specific ones on [`Profile`].

use std::{fmt, num::ParseIntError, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Identifiers ─────────────────────────────────────────────────────────────

macro_rules! numeric_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
    }

    impl FromStr for $name {
      type Err = ParseIntError;

      fn from_str(s: &str) -> Result<Self, Self::Err> { s.parse().map(Self) }
    }
  };
}

numeric_id!(
  /// Row identifier in the employee domain.
  EmployeeId
);
numeric_id!(
  /// Row identifier in the person domain, shared by both sub-types.
  PersonId
);

// ─── Employees ───────────────────────────────────────────────────────────────

/// A staff member. Never deleted; deactivated through `is_active` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
  pub id:            EmployeeId,
  pub email:         String,
  pub full_name:     String,
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub is_active:     bool,
  pub is_admin:      bool,
  pub created_at:    DateTime<Utc>,
}

/// Input for [`PrincipalStore::insert_employee`](crate::store::PrincipalStore::insert_employee).
/// The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewEmployee {
  pub email:         String,
  pub full_name:     String,
  pub password_hash: String,
  pub is_active:     bool,
  pub is_admin:      bool,
}

/// Partial update applied by an admin. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeUpdate {
  pub full_name: Option<String>,
  pub is_active: Option<bool>,
  pub is_admin:  Option<bool>,
}

// ─── Addresses ───────────────────────────────────────────────────────────────

/// A postal address owned by exactly one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub address_id:  i64,
  pub street:      String,
  pub number:      String,
  pub complement:  Option<String>,
  pub district:    String,
  pub city:        String,
  pub state:       String,
  pub postal_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
  pub street:      String,
  pub number:      String,
  #[serde(default)]
  pub complement:  Option<String>,
  pub district:    String,
  pub city:        String,
  pub state:       String,
  pub postal_code: String,
}

// ─── Persons ─────────────────────────────────────────────────────────────────

/// Sub-type discriminant of a [`Person`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonKind {
  Individual,
  Organizational,
}

impl PersonKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Individual => "individual",
      Self::Organizational => "organizational",
    }
  }
}

impl fmt::Display for PersonKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// An external customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub id:            PersonId,
  pub email:         String,
  pub phone:         String,
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub is_active:     bool,
  pub created_at:    DateTime<Utc>,
  pub address:       Address,
  #[serde(flatten)]
  pub profile:       Profile,
}

impl Person {
  pub fn kind(&self) -> PersonKind { self.profile.kind() }

  pub fn as_individual(&self) -> Option<&Individual> {
    match &self.profile {
      Profile::Individual(i) => Some(i),
      Profile::Organizational(_) => None,
    }
  }

  pub fn as_organization(&self) -> Option<&Organization> {
    match &self.profile {
      Profile::Organizational(o) => Some(o),
      Profile::Individual(_) => None,
    }
  }
}

/// Sub-type specific data of a persisted person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Profile {
  Individual(Individual),
  Organizational(Organization),
}

impl Profile {
  pub fn kind(&self) -> PersonKind {
    match self {
      Self::Individual(_) => PersonKind::Individual,
      Self::Organizational(_) => PersonKind::Organizational,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
  pub full_name:   String,
  pub national_id: String,
  pub license_id:  String,
  /// The organization this individual currently drives for.
  pub employer:    Option<PersonId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
  pub legal_name: String,
  pub trade_name: Option<String>,
  pub tax_id:     String,
  /// Individuals currently driving for this organization, ascending.
  pub drivers:    Vec<PersonId>,
}

/// Sub-type data supplied on creation or replacement. Associations are not
/// part of it; they are managed through the relationship operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileData {
  Individual {
    full_name:   String,
    national_id: String,
    license_id:  String,
  },
  Organizational {
    legal_name: String,
    trade_name: Option<String>,
    tax_id:     String,
  },
}

impl ProfileData {
  pub fn kind(&self) -> PersonKind {
    match self {
      Self::Individual { .. } => PersonKind::Individual,
      Self::Organizational { .. } => PersonKind::Organizational,
    }
  }
}

/// Input for [`PrincipalStore::insert_person`](crate::store::PrincipalStore::insert_person).
#[derive(Debug, Clone)]
pub struct NewPerson {
  pub email:           String,
  pub phone:           String,
  pub password_hash:   String,
  pub address:         NewAddress,
  pub profile:         ProfileData,
  /// Individuals to associate as drivers in the same transaction. Only
  /// meaningful for organizational persons; must be empty otherwise.
  pub initial_drivers: Vec<PersonId>,
}

/// Full replacement of a person's mutable data. The sub-type is fixed at
/// creation; `profile.kind()` must match the stored one.
#[derive(Debug, Clone)]
pub struct PersonUpdate {
  pub email:         String,
  pub phone:         String,
  /// New hash, or `None` to keep the current password.
  pub password_hash: Option<String>,
  pub address:       NewAddress,
  pub profile:       ProfileData,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_parse_from_decimal_strings() {
    assert_eq!("42".parse::<PersonId>().unwrap(), PersonId(42));
    assert!("abc".parse::<EmployeeId>().is_err());
    assert!("".parse::<EmployeeId>().is_err());
  }

  #[test]
  fn person_kind_matches_profile() {
    let profile = Profile::Organizational(Organization {
      legal_name: "Acme Logistics".into(),
      trade_name: None,
      tax_id:     "12345678000199".into(),
      drivers:    vec![],
    });
    assert_eq!(profile.kind(), PersonKind::Organizational);
    assert_eq!(profile.kind().to_string(), "organizational");
  }
}
