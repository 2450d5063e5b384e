//! HS256 bearer tokens.
//!
//! A token is a compact JWT over [`Claims`]. Verification collapses every
//! failure (bad encoding, bad signature, wrong algorithm, missing claims,
//! expiry) into the single [`TokenInvalid`] outcome.

use std::{collections::HashSet, fmt};

use chrono::{DateTime, Duration, Utc};
use frota_core::{Domain, Error, Result, principal::PersonKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a token asserts about its bearer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
  /// Decimal id of the principal.
  pub sub:   String,
  /// Domain the subject id belongs to.
  pub dom:   Domain,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  /// Person sub-type, so downstream services need no extra lookup.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub kind:  Option<PersonKind>,
}

/// A [`Grant`] plus its validity window, in seconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  #[serde(flatten)]
  pub grant: Grant,
  pub iat:   i64,
  pub exp:   i64,
}

/// The token could not be accepted. Deliberately carries no reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid token")]
pub struct TokenInvalid;

/// Issues and verifies tokens signed with the process-wide secret.
pub struct TokenService {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
}

impl fmt::Debug for TokenService {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TokenService").finish_non_exhaustive()
  }
}

impl TokenService {
  pub fn new(secret: &[u8]) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked in `verify_at` against an explicit clock, with no
    // leeway: a token is dead from the second `exp` is reached.
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.required_spec_claims =
      HashSet::from(["exp".to_owned(), "iat".to_owned(), "sub".to_owned()]);

    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
    }
  }

  pub fn issue(&self, grant: Grant, ttl: Duration) -> Result<String> {
    self.issue_at(grant, ttl, Utc::now())
  }

  pub fn issue_at(&self, grant: Grant, ttl: Duration, now: DateTime<Utc>) -> Result<String> {
    let claims = Claims {
      grant,
      iat: now.timestamp(),
      exp: (now + ttl).timestamp(),
    };
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| Error::Internal(format!("token signing failed: {e}")))
  }

  pub fn verify(&self, token: &str) -> Result<Claims, TokenInvalid> {
    self.verify_at(token, Utc::now())
  }

  pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenInvalid> {
    let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
      .map_err(|e| {
        tracing::debug!(error = %e, "token failed to decode");
        TokenInvalid
      })?;

    if now.timestamp() >= data.claims.exp {
      tracing::debug!(exp = data.claims.exp, "token expired");
      return Err(TokenInvalid);
    }
    Ok(data.claims)
  }
}
