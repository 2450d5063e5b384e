//! Handlers for `/clients/individuals`.
//!
//! | Method   | Path | Gate |
//! |----------|------|------|
//! | `POST`   | `/clients/individuals` | none (sign-up) |
//! | `GET`    | `/clients/individuals` | active employee |
//! | `GET`    | `/clients/individuals/{id}` | active employee |
//! | `PUT`    | `/clients/individuals/{id}` | active employee |
//! | `DELETE` | `/clients/individuals/{id}` | active employee |

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

/// Sign-up payload. On update `password` may be omitted to keep the current
/// one.
#[derive(Debug, Deserialize)]
pub struct IndividualBody {
  pub email:       String,
  pub phone:       String,
  pub full_name:   String,
  pub national_id: String,
  pub license_id:  String,
  #[serde(default)]
  pub password:    Option<String>,
  pub address:     NewAddress,
}

impl IndividualBody {
  fn validate(&self, password_required: bool) -> Result<()> {
    let mut v = Validator::new();
    v.email("email", self.email.trim())
      .required("phone", &self.phone)
      .required("full_name", &self.full_name)
      .required("national_id", &self.national_id)
      .required("license_id", &self.license_id)
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
    ProfileData::Individual {
      full_name:   self.full_name.clone(),
      national_id: self.national_id.clone(),
      license_id:  self.license_id.clone(),
    }
  }
}

/// `POST /clients/individuals`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<IndividualBody>,
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
      initial_drivers: Vec::new(),
    })
    .await
    .into_core()?;
  Ok((StatusCode::CREATED, Json(person)))
}

/// `GET /clients/individuals`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _employee: CurrentEmployee,
) -> Result<Json<Vec<Person>>>
where
  S: PrincipalStore,
{
  let persons = state
    .store
    .list_persons(Some(PersonKind::Individual))
    .await
    .into_core()?;
  Ok(Json(persons))
}

/// `GET /clients/individuals/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _employee: CurrentEmployee,
  Path(id): Path<PersonId>,
) -> Result<Json<Person>>
where
  S: PrincipalStore,
{
  let person = state.store.person_by_id(id).await.into_core()?;
  Ok(Json(of_kind(person, id, PersonKind::Individual)?))
}

/// `PUT /clients/individuals/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentEmployee(employee): CurrentEmployee,
  Path(id): Path<PersonId>,
  Json(body): Json<IndividualBody>,
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
  tracing::info!(person = %id, by = %employee.id, "individual updated");
  Ok(Json(person))
}

/// `DELETE /clients/individuals/{id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  CurrentEmployee(employee): CurrentEmployee,
  Path(id): Path<PersonId>,
) -> Result<StatusCode>
where
  S: PrincipalStore,
{
  let person = state.store.person_by_id(id).await.into_core()?;
  of_kind(person, id, PersonKind::Individual)?;
  state.store.delete_person(id).await.into_core()?;
  tracing::info!(person = %id, by = %employee.id, "individual deleted");
  Ok(StatusCode::NO_CONTENT)
}
