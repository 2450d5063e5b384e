//! Password hashing with argon2id.

use argon2::{
  Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
  password_hash::SaltString,
};
use frota_core::{Error, Result};
use rand_core::OsRng;

/// Hashes and verifies passwords. Each hash embeds its own random salt and
/// cost parameters in PHC string format (`$argon2id$v=19$…`).
#[derive(Debug, Clone, Default)]
pub struct CredentialService {
  params: Params,
}

impl CredentialService {
  /// Use explicit cost parameters for new hashes. Verification always uses
  /// the parameters embedded in the stored hash.
  pub fn new(params: Params) -> Self { Self { params } }

  fn hasher(&self) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
  }

  pub fn hash(&self, plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    self
      .hasher()
      .hash_password(plaintext.as_bytes(), &salt)
      .map(|hash| hash.to_string())
      .map_err(|e| Error::Internal(format!("argon2 error: {e}")))
  }

  /// `false` for a wrong password and for anything that is not a valid PHC
  /// string.
  pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
      tracing::warn!("stored password hash is not a valid PHC string");
      return false;
    };
    self
      .hasher()
      .verify_password(plaintext.as_bytes(), &parsed)
      .is_ok()
  }
}

#[cfg(test)]
pub(crate) fn cheap() -> CredentialService {
  CredentialService::new(Params::new(Params::MIN_M_COST, 1, 1, None).unwrap())
}
