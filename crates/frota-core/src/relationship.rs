//! Driver association rules between organizational and individual persons.
//!
//! The association is a single record keyed by the individual, so an
//! individual has at most one employer by construction. Storage backends load
//! a [`LinkSnapshot`] inside a transaction, ask [`plan_associate`] or
//! [`plan_remove`] what to do, and apply the answer before committing.

use std::sync::Arc;

use crate::{
  error::{Error, Missing, Result},
  principal::{Person, PersonId, PersonKind},
  store::{PrincipalStore, StoreResultExt},
};

/// The state the rules need, read in the same transaction that applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSnapshot {
  /// Sub-type of the organization-side id, if such a person exists.
  pub organization: Option<PersonKind>,
  /// Sub-type of the individual-side id, if such a person exists.
  pub individual:   Option<PersonKind>,
  /// Current employer of the individual.
  pub employer:     Option<PersonId>,
}

/// What the store must write for an association request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
  Insert,
  /// The pair is already associated; nothing to write.
  Unchanged,
}

/// Result of a successful [`PrincipalStore::associate_driver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverLink {
  pub organization: PersonId,
  pub individual:   PersonId,
  pub change:       LinkChange,
}

fn ensure_parties(
  organization: PersonId,
  individual: PersonId,
  snapshot: &LinkSnapshot,
) -> Result<()> {
  if snapshot.organization != Some(PersonKind::Organizational) {
    return Err(Error::NotFound(Missing::Organization(organization)));
  }
  if snapshot.individual != Some(PersonKind::Individual) {
    return Err(Error::NotFound(Missing::Individual(individual)));
  }
  Ok(())
}

/// Decide whether `individual` may start driving for `organization`.
///
/// Re-associating an existing pair is a no-op success so clients can retry.
pub fn plan_associate(
  organization: PersonId,
  individual: PersonId,
  snapshot: &LinkSnapshot,
) -> Result<LinkChange> {
  ensure_parties(organization, individual, snapshot)?;
  match snapshot.employer {
    None => Ok(LinkChange::Insert),
    Some(current) if current == organization => Ok(LinkChange::Unchanged),
    Some(_) => Err(Error::AssociationConflict { individual, organization }),
  }
}

/// Decide whether `organization` may release `individual`.
///
/// A missing individual is `NotFound`; an existing one driving for somebody
/// else, or for nobody, is `NotAssociated`.
pub fn plan_remove(
  organization: PersonId,
  individual: PersonId,
  snapshot: &LinkSnapshot,
) -> Result<()> {
  ensure_parties(organization, individual, snapshot)?;
  if snapshot.employer == Some(organization) {
    Ok(())
  } else {
    Err(Error::NotAssociated { individual, organization })
  }
}

// ─── Manager ─────────────────────────────────────────────────────────────────

/// Entry point for association management on behalf of an organization.
#[derive(Debug)]
pub struct RelationshipManager<S> {
  store: Arc<S>,
}

impl<S> Clone for RelationshipManager<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S> RelationshipManager<S>
where
  S: PrincipalStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub async fn associate_driver(
    &self,
    organization: PersonId,
    individual: PersonId,
  ) -> Result<DriverLink> {
    let link = self
      .store
      .associate_driver(organization, individual)
      .await
      .into_core()?;
    match link.change {
      LinkChange::Insert => {
        tracing::info!(%organization, %individual, "driver associated");
      }
      LinkChange::Unchanged => {
        tracing::debug!(%organization, %individual, "driver already associated");
      }
    }
    Ok(link)
  }

  pub async fn remove_driver(&self, organization: PersonId, individual: PersonId) -> Result<()> {
    self
      .store
      .remove_driver(organization, individual)
      .await
      .into_core()?;
    tracing::info!(%organization, %individual, "driver removed");
    Ok(())
  }

  pub async fn drivers(&self, organization: PersonId) -> Result<Vec<Person>> {
    self.store.drivers_of(organization).await.into_core()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ORG: PersonId = PersonId(1);
  const OTHER_ORG: PersonId = PersonId(2);
  const DRIVER: PersonId = PersonId(10);

  fn snapshot(employer: Option<PersonId>) -> LinkSnapshot {
    LinkSnapshot {
      organization: Some(PersonKind::Organizational),
      individual: Some(PersonKind::Individual),
      employer,
    }
  }

  #[test]
  fn associate_unlinked_inserts() {
    assert_eq!(plan_associate(ORG, DRIVER, &snapshot(None)).unwrap(), LinkChange::Insert);
  }

  #[test]
  fn associate_same_pair_is_unchanged() {
    assert_eq!(
      plan_associate(ORG, DRIVER, &snapshot(Some(ORG))).unwrap(),
      LinkChange::Unchanged
    );
  }

  #[test]
  fn associate_elsewhere_conflicts() {
    let err = plan_associate(ORG, DRIVER, &snapshot(Some(OTHER_ORG))).unwrap_err();
    assert!(matches!(
      err,
      Error::AssociationConflict { individual: DRIVER, organization: ORG }
    ));
  }

  #[test]
  fn missing_or_wrong_kind_is_not_found() {
    let mut s = snapshot(None);
    s.individual = Some(PersonKind::Organizational);
    assert!(matches!(
      plan_associate(ORG, DRIVER, &s),
      Err(Error::NotFound(Missing::Individual(DRIVER)))
    ));

    let mut s = snapshot(None);
    s.organization = None;
    assert!(matches!(
      plan_associate(ORG, DRIVER, &s),
      Err(Error::NotFound(Missing::Organization(ORG)))
    ));

    let mut s = snapshot(None);
    s.organization = Some(PersonKind::Individual);
    assert!(matches!(
      plan_remove(ORG, DRIVER, &s),
      Err(Error::NotFound(Missing::Organization(ORG)))
    ));
  }

  #[test]
  fn remove_requires_current_link_to_caller() {
    assert!(plan_remove(ORG, DRIVER, &snapshot(Some(ORG))).is_ok());
    assert!(matches!(
      plan_remove(ORG, DRIVER, &snapshot(Some(OTHER_ORG))),
      Err(Error::NotAssociated { individual: DRIVER, organization: ORG })
    ));
    assert!(matches!(
      plan_remove(ORG, DRIVER, &snapshot(None)),
      Err(Error::NotAssociated { .. })
    ));
  }
}
