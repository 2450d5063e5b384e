//! Handlers for the employee domain.
//!
//! | Method  | Path | Gate |
//! |---------|------|------|
//! | `POST`  | `/auth/token` | none |
//! | `GET`   | `/auth/employees/me` | active employee |
//! | `GET`   | `/auth/employees` | admin |
//! | `POST`  | `/auth/employees` | admin |
//! | `PATCH` | `/auth/employees/{id}` | admin |

use axum::{
  Form, Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use frota_core::{
  Domain,
  principal::{Employee, EmployeeId, EmployeeUpdate, NewEmployee},
  store::{PrincipalStore, StoreResultExt},
};
use serde::Deserialize;

use super::{LoginForm, TokenResponse, issue_token};
use crate::{
  AppState,
  auth::{CurrentAdmin, CurrentEmployee},
  error::Result,
  validate::Validator,
};

/// `POST /auth/token`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>>
where
  S: PrincipalStore,
{
  issue_token(&state, Domain::Employee, form).await
}

/// `GET /auth/employees/me`
pub async fn me(CurrentEmployee(employee): CurrentEmployee) -> Json<Employee> { Json(employee) }

/// `GET /auth/employees`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _admin: CurrentAdmin,
) -> Result<Json<Vec<Employee>>>
where
  S: PrincipalStore,
{
  let employees = state.store.list_employees().await.into_core()?;
  Ok(Json(employees))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub email:     String,
  pub full_name: String,
  pub password:  String,
  #[serde(default)]
  pub is_admin:  bool,
  #[serde(default = "active_by_default")]
  pub is_active: bool,
}

fn active_by_default() -> bool { true }

/// `POST /auth/employees`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentAdmin(admin): CurrentAdmin,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse>
where
  S: PrincipalStore,
{
  Validator::new()
    .email("email", body.email.trim())
    .required("full_name", &body.full_name)
    .password("password", &body.password)
    .finish()?;

  let employee = state
    .store
    .insert_employee(NewEmployee {
      email:         body.email.trim().to_string(),
      full_name:     body.full_name,
      password_hash: state.credentials.hash(&body.password)?,
      is_active:     body.is_active,
      is_admin:      body.is_admin,
    })
    .await
    .into_core()?;

  tracing::info!(employee = %employee.id, by = %admin.id, admin = employee.is_admin, "employee created");
  Ok((StatusCode::CREATED, Json(employee)))
}

/// `PATCH /auth/employees/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentAdmin(admin): CurrentAdmin,
  Path(id): Path<EmployeeId>,
  Json(update): Json<EmployeeUpdate>,
) -> Result<Json<Employee>>
where
  S: PrincipalStore,
{
  if let Some(name) = &update.full_name {
    Validator::new().required("full_name", name).finish()?;
  }
  let employee = state.store.update_employee(id, update).await.into_core()?;
  tracing::info!(employee = %id, by = %admin.id, "employee updated");
  Ok(Json(employee))
}
