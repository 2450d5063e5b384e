//! Handlers for an organization managing its own drivers.
//!
//! | Method   | Path | Gate |
//! |----------|------|------|
//! | `GET`    | `/clients/organizations/me/drivers` | organization |
//! | `POST`   | `/clients/organizations/me/drivers` | organization |
//! | `DELETE` | `/clients/organizations/me/drivers/{individual_id}` | organization |
//!
//! Association changes answer with the organization as it stands afterwards.

use axum::{
  Json,
  extract::{Path, State},
};
use frota_core::{
  principal::{Person, PersonId},
  store::{PrincipalStore, StoreResultExt},
};
use serde::Deserialize;

use crate::{AppState, auth::CurrentOrganization, error::Result};

/// `GET /clients/organizations/me/drivers`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentOrganization(org): CurrentOrganization,
) -> Result<Json<Vec<Person>>>
where
  S: PrincipalStore,
{
  Ok(Json(state.relationships().drivers(org.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AssociateBody {
  pub individual_id: PersonId,
}

/// `POST /clients/organizations/me/drivers`
///
/// Repeating the call for a driver already associated with the caller
/// succeeds without changing anything.
pub async fn associate<S>(
  State(state): State<AppState<S>>,
  CurrentOrganization(org): CurrentOrganization,
  Json(body): Json<AssociateBody>,
) -> Result<Json<Person>>
where
  S: PrincipalStore,
{
  state
    .relationships()
    .associate_driver(org.id, body.individual_id)
    .await?;
  reload(&state, org).await
}

/// `DELETE /clients/organizations/me/drivers/{individual_id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  CurrentOrganization(org): CurrentOrganization,
  Path(individual_id): Path<PersonId>,
) -> Result<Json<Person>>
where
  S: PrincipalStore,
{
  state.relationships().remove_driver(org.id, individual_id).await?;
  reload(&state, org).await
}

/// The organization after a change, falling back to the caller's copy if it
/// vanished in between.
async fn reload<S>(state: &AppState<S>, org: Person) -> Result<Json<Person>>
where
  S: PrincipalStore,
{
  let fresh = state.store.person_by_id(org.id).await.into_core()?;
  Ok(Json(fresh.unwrap_or(org)))
}
