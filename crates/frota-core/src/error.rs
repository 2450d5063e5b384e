//! Error taxonomy shared by every layer of the service.
//!
//! Each variant is a terminal failure returned to the immediate caller. The
//! transport maps them to status codes; the messages here are the ones a
//! client is allowed to see.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::principal::{EmployeeId, PersonId};

/// The two principal domains. Each has its own email uniqueness scope and its
/// own token audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
  Employee,
  Person,
}

impl fmt::Display for Domain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Employee => f.write_str("employee"),
      Self::Person => f.write_str("person"),
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// Unknown email or wrong password. Deliberately says nothing about which.
  #[error("incorrect {0} email or password")]
  InvalidCredentials(Domain),

  #[error("this account is temporarily blocked, contact support")]
  AccountBlocked,

  /// Bad signature, malformed token, expired token, unknown subject.
  #[error("could not validate {0} credentials")]
  TokenInvalid(Domain),

  #[error("employee account is inactive")]
  EmployeeInactive,

  #[error("access denied: {0}")]
  InsufficientRole(&'static str),

  #[error("email {email:?} is already registered in the {domain} domain")]
  DuplicateEmail { domain: Domain, email: String },

  #[error("{0} not found")]
  NotFound(Missing),

  #[error("individual {individual} already drives for another organization")]
  AssociationConflict {
    individual:   PersonId,
    /// The organization that asked, not the current employer.
    organization: PersonId,
  },

  #[error("individual {individual} is not a driver of organization {organization}")]
  NotAssociated {
    individual:   PersonId,
    organization: PersonId,
  },

  /// Hashing or signing failed. The message is for logs only.
  #[error("internal error: {0}")]
  Internal(String),

  /// Opaque backend failure. The source is for logs only.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

/// What a [`Error::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
  Employee(EmployeeId),
  Person(PersonId),
  Individual(PersonId),
  Organization(PersonId),
}

impl fmt::Display for Missing {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Employee(id) => write!(f, "employee {id}"),
      Self::Person(id) => write!(f, "person {id}"),
      Self::Individual(id) => write!(f, "individual {id}"),
      Self::Organization(id) => write!(f, "organization {id}"),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
