pub mod clients;
pub mod drivers;
pub mod employees;
pub mod individuals;
pub mod organizations;

use axum::Json;
use frota_core::{
  Domain, Error as CoreError,
  error::Missing,
  principal::{Person, PersonId, PersonKind},
  store::PrincipalStore,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{AppState, error::Result};

/// `GET /`
pub async fn root() -> Json<Value> {
  Json(json!({ "message": "Frota identity service online" }))
}

/// OAuth2 password-grant form. `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
  pub access_token: String,
  pub token_type:   String,
}

pub(crate) async fn issue_token<S>(
  state: &AppState<S>,
  domain: Domain,
  form: LoginForm,
) -> Result<Json<TokenResponse>>
where
  S: PrincipalStore,
{
  let access_token = state
    .authenticator()
    .login(&state.tokens, domain, &form.username, &form.password, state.token_ttl())
    .await?;
  Ok(Json(TokenResponse { access_token, token_type: "bearer".to_string() }))
}

/// Keep `person` only if it is of `kind`; anything else is reported as a
/// missing individual or organization.
pub(crate) fn of_kind(
  person: Option<Person>,
  id: PersonId,
  kind: PersonKind,
) -> std::result::Result<Person, CoreError> {
  match person {
    Some(p) if p.kind() == kind => Ok(p),
    _ => Err(CoreError::NotFound(match kind {
      PersonKind::Individual => Missing::Individual(id),
      PersonKind::Organizational => Missing::Organization(id),
    })),
  }
}
