//! Handlers shared by both person sub-types.
//!
//! | Method  | Path | Gate |
//! |---------|------|------|
//! | `POST`  | `/clients/token` | none |
//! | `GET`   | `/clients/me` | person |
//! | `PATCH` | `/clients/{id}/status` | active employee |

use axum::{
  Form, Json,
  extract::{Path, State},
};
use frota_core::{
  Domain,
  principal::{Person, PersonId},
  store::{PrincipalStore, StoreResultExt},
};
use serde::Deserialize;

use super::{LoginForm, TokenResponse, issue_token};
use crate::{
  AppState,
  auth::{CurrentEmployee, CurrentPerson},
  error::Result,
};

/// `POST /clients/token`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>>
where
  S: PrincipalStore,
{
  issue_token(&state, Domain::Person, form).await
}

/// `GET /clients/me`
pub async fn me(CurrentPerson(person): CurrentPerson) -> Json<Person> { Json(person) }

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub is_active: bool,
}

/// `PATCH /clients/{id}/status`: block or unblock a person's logins.
pub async fn set_status<S>(
  State(state): State<AppState<S>>,
  CurrentEmployee(employee): CurrentEmployee,
  Path(id): Path<PersonId>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Person>>
where
  S: PrincipalStore,
{
  let person = state
    .store
    .set_person_active(id, body.is_active)
    .await
    .into_core()?;
  tracing::info!(person = %id, by = %employee.id, active = body.is_active, "person status changed");
  Ok(Json(person))
}
