//! Field rules applied to request bodies before they reach the core.

use frota_core::principal::NewAddress;

use crate::error::ApiError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Collects every broken rule of a payload so the client sees them all at
/// once.
#[derive(Debug, Default)]
pub struct Validator {
  problems: Vec<String>,
}

impl Validator {
  pub fn new() -> Self { Self::default() }

  pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
    if value.trim().is_empty() {
      self.problems.push(format!("{field}: must not be blank"));
    }
    self
  }

  pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
    if !is_email(value) {
      self.problems.push(format!("{field}: not a valid email address"));
    }
    self
  }

  pub fn password(&mut self, field: &str, value: &str) -> &mut Self {
    if value.chars().count() < MIN_PASSWORD_LEN {
      self
        .problems
        .push(format!("{field}: must be at least {MIN_PASSWORD_LEN} characters"));
    }
    self
  }

  pub fn address(&mut self, field: &str, address: &NewAddress) -> &mut Self {
    for (name, value) in [
      ("street", &address.street),
      ("number", &address.number),
      ("district", &address.district),
      ("city", &address.city),
      ("state", &address.state),
      ("postal_code", &address.postal_code),
    ] {
      self.required(&format!("{field}.{name}"), value);
    }
    self
  }

  pub fn finish(&mut self) -> Result<(), ApiError> {
    if self.problems.is_empty() {
      Ok(())
    } else {
      Err(ApiError::Validation(std::mem::take(&mut self.problems)))
    }
  }
}

/// One `@`, something on each side, no whitespace.
fn is_email(value: &str) -> bool {
  let Some((local, domain)) = value.split_once('@') else { return false };
  !local.is_empty()
    && !domain.is_empty()
    && !domain.contains('@')
    && !value.chars().any(char::is_whitespace)
}
