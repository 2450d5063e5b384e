//! Bearer-token extractors.
//!
//! Each extractor fixes the domain and role a route requires. Putting one in
//! a handler's argument list is what gates the route.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use frota_core::{
  Domain, Error as CoreError,
  principal::{Employee, Person},
  store::PrincipalStore,
};

use crate::{AppState, error::ApiError};

/// Pull the token out of `Authorization: Bearer <token>`. A missing or
/// malformed header is an invalid token for `domain`.
pub fn bearer_token(headers: &HeaderMap, domain: Domain) -> Result<&str, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(CoreError::TokenInvalid(domain))?;

  let (scheme, token) = value
    .split_once(' ')
    .ok_or(CoreError::TokenInvalid(domain))?;
  if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
    return Err(CoreError::TokenInvalid(domain).into());
  }
  Ok(token.trim())
}

/// An active employee, admin or not.
#[derive(Debug, Clone)]
pub struct CurrentEmployee(pub Employee);

/// An active employee with the admin flag.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub Employee);

/// A person of either sub-type.
#[derive(Debug, Clone)]
pub struct CurrentPerson(pub Person);

/// A person of the organizational sub-type.
#[derive(Debug, Clone)]
pub struct CurrentOrganization(pub Person);

impl<S> FromRequestParts<AppState<S>> for CurrentEmployee
where
  S: PrincipalStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers, Domain::Employee)?;
    Ok(Self(state.guard().active_employee(token).await?))
  }
}

impl<S> FromRequestParts<AppState<S>> for CurrentAdmin
where
  S: PrincipalStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers, Domain::Employee)?;
    Ok(Self(state.guard().admin(token).await?))
  }
}

impl<S> FromRequestParts<AppState<S>> for CurrentPerson
where
  S: PrincipalStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers, Domain::Person)?;
    Ok(Self(state.guard().person(token).await?))
  }
}

impl<S> FromRequestParts<AppState<S>> for CurrentOrganization
where
  S: PrincipalStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers, Domain::Person)?;
    Ok(Self(state.guard().organization(token).await?))
  }
}
