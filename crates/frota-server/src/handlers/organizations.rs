//! Handlers for `/clients/organizations`.
//!
//! | Method   | Path | Gate |
//! |----------|------|------|
//! | `POST`   | `/clients/organizations` | none (sign-up) |
//! | `GET`    | `/clients/organizations` | active employee |
//! | `GET`    | `/clients/organizations/{id}` | active employee |
//! | `PUT`    | `/clients/organizations/{id}` | active employee |
//! | `DELETE` | `/clients/organizations/{id}` | active employee |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use frota_core::{
  principal::{NewAddress, NewPerson, Person, PersonId, PersonKind, PersonUpdate, ProfileData},
  store::{PrincipalStore, StoreResultExt},
};
use serde::Deserialize;

use super::of_kind;
use crate::{AppState, auth::CurrentEmployee, error::Result, validate::Validator};

#[derive(Debug, Deserialize)]
pub struct OrganizationBody {
  pub email:      String,
  pub phone:      String,
  pub legal_name: String,
  #[serde(default)]
  pub trade_name: Option<String>,
  pub tax_id:     String,
  #[serde(default)]
  pub password:   Option<String>,
  pub address:    NewAddress,
  /// Individuals to take on as drivers at sign-up. Ignored on update.
  #[serde(default)]
  pub driver_ids: Vec<PersonId>,
}

impl OrganizationBody {
  fn validate(&self, password_required: bool) -> Result<()> {
    let mut v = Validator::new();
    v.email("email", self.email.trim())
      .required("phone", &self.phone)
      .required("legal_name", &self.legal_name)
      .required("tax_id", &self.tax_id)
      .address("address", &self.address);
    match &self.password {
      Some(pw) => {
        v.password("password", pw);
      }
      None if password_required => {
        v.required("password", "");
      }
      None => {}
    }
    v.finish()
  }

  fn profile(&self) -> ProfileData {
    ProfileData::Organizational {
      legal_name: self.legal_name.clone(),
      trade_name: self.trade_name.clone().filter(|t| !t.trim().is_empty()),
      tax_id:     self.tax_id.clone(),
    }
  }
}

/// `POST /clients/organizations`
///
/// Every id in `driver_ids` is associated in the same transaction as the
/// insert; one refusal (unknown individual, individual already driving
/// elsewhere) rejects the whole sign-up.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<OrganizationBody>,
) -> Result<impl IntoResponse>
where
  S: PrincipalStore,
{
  body.validate(true)?;
  let password = body.password.as_deref().unwrap_or_default();

  let person = state
    .store
    .insert_person(NewPerson {
      email:           body.email.trim().to_string(),
      phone:           body.phone.clone(),
      password_hash:   state.credentials.hash(password)?,
      profile:         body.profile(),
      address:         body.address,
      initial_drivers: body.driver_ids,
    })
    .await
    .into_core()?;
  Ok((StatusCode::CREATED, Json(person)))
}

/// `GET /clients/organizations`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _employee: CurrentEmployee,
) -> Result<Json<Vec<Person>>>
where
  S: PrincipalStore,
{
  let persons = state
    .store
    .list_persons(Some(PersonKind::Organizational))
    .await
    .into_core()?;
  Ok(Json(persons))
}

/// `GET /clients/organizations/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _employee: CurrentEmployee,
  Path(id): Path<PersonId>,
) -> Result<Json<Person>>
where
  S: PrincipalStore,
{
  let person = state.store.person_by_id(id).await.into_core()?;
  Ok(Json(of_kind(person, id, PersonKind::Organizational)?))
}

/// `PUT /clients/organizations/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentEmployee(employee): CurrentEmployee,
  Path(id): Path<PersonId>,
  Json(body): Json<OrganizationBody>,
) -> Result<Json<Person>>
where
  S: PrincipalStore,
{
  body.validate(false)?;
  let password_hash = match &body.password {
    Some(pw) => Some(state.credentials.hash(pw)?),
    None => None,
  };

  let person = state
    .store
    .update_person(id, PersonUpdate {
      email: body.email.trim().to_string(),
      phone: body.phone.clone(),
      password_hash,
      profile: body.profile(),
      address: body.address,
    })
    .await
    .into_core()?;
  tracing::info!(person = %id, by = %employee.id, "organization updated");
  Ok(Json(person))
}

/// `DELETE /clients/organizations/{id}`. Its drivers become unassociated.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  CurrentEmployee(employee): CurrentEmployee,
  Path(id): Path<PersonId>,
) -> Result<StatusCode>
where
  S: PrincipalStore,
{
  let person = state.store.person_by_id(id).await.into_core()?;
  of_kind(person, id, PersonKind::Organizational)?;
  state.store.delete_person(id).await.into_core()?;
  tracing::info!(person = %id, by = %employee.id, "organization deleted");
  Ok(StatusCode::NO_CONTENT)
}
