//! Integration tests for `SqliteStore` against an in-memory database.

use frota_core::{
  Domain, Error as CoreError,
  error::Missing,
  principal::{
    EmployeeId, EmployeeUpdate, NewAddress, NewEmployee, NewPerson, PersonId, PersonKind,
    PersonUpdate, ProfileData,
  },
  relationship::LinkChange,
  store::PrincipalStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn core(err: Error) -> CoreError { err.into() }

fn address() -> NewAddress {
  NewAddress {
    street:      "Rua das Flores".into(),
    number:      "100".into(),
    complement:  None,
    district:    "Centro".into(),
    city:        "Curitiba".into(),
    state:       "PR".into(),
    postal_code: "80000000".into(),
  }
}

fn employee(email: &str, admin: bool) -> NewEmployee {
  NewEmployee {
    email:         email.into(),
    full_name:     "Ana Souza".into(),
    password_hash: "$argon2id$placeholder".into(),
    is_active:     true,
    is_admin:      admin,
  }
}

fn individual(email: &str) -> NewPerson {
  NewPerson {
    email:           email.into(),
    phone:           "41999990000".into(),
    password_hash:   "$argon2id$placeholder".into(),
    address:         address(),
    profile:         ProfileData::Individual {
      full_name:   "Bruno Lima".into(),
      national_id: "12345678901".into(),
      license_id:  "98765432100".into(),
    },
    initial_drivers: vec![],
  }
}

fn organization(email: &str, drivers: Vec<PersonId>) -> NewPerson {
  NewPerson {
    email:           email.into(),
    phone:           "4133330000".into(),
    password_hash:   "$argon2id$placeholder".into(),
    address:         address(),
    profile:         ProfileData::Organizational {
      legal_name: "Transportes Exemplo LTDA".into(),
      trade_name: Some("Exemplo".into()),
      tax_id:     "12345678000199".into(),
    },
    initial_drivers: drivers,
  }
}

async fn drivers(s: &SqliteStore, org: PersonId) -> Vec<PersonId> {
  s.person_by_id(org)
    .await
    .unwrap()
    .unwrap()
    .as_organization()
    .unwrap()
    .drivers
    .clone()
}

async fn employer(s: &SqliteStore, ind: PersonId) -> Option<PersonId> {
  s.person_by_id(ind)
    .await
    .unwrap()
    .unwrap()
    .as_individual()
    .unwrap()
    .employer
}

// ─── Employees ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_lookup_employee() {
  let s = store().await;
  let created = s.insert_employee(employee("admin@frota.test", true)).await.unwrap();
  assert!(created.is_admin);
  assert!(created.is_active);

  let by_id = s.employee_by_id(created.id).await.unwrap().unwrap();
  assert_eq!(by_id.email, "admin@frota.test");
  assert_eq!(by_id.password_hash, "$argon2id$placeholder");

  let by_email = s.employee_by_email("ADMIN@frota.test").await.unwrap();
  assert_eq!(by_email.map(|e| e.id), Some(created.id));

  assert!(s.employee_by_id(EmployeeId(999)).await.unwrap().is_none());
}

#[tokio::test]
async fn employee_email_is_unique_within_employees() {
  let s = store().await;
  s.insert_employee(employee("ops@frota.test", false)).await.unwrap();
  let err = core(s.insert_employee(employee("ops@frota.test", true)).await.unwrap_err());
  assert!(matches!(err, CoreError::DuplicateEmail { domain: Domain::Employee, .. }));
  assert_eq!(s.list_employees().await.unwrap().len(), 1);
}

#[tokio::test]
async fn email_uniqueness_ignores_case() {
  let s = store().await;
  let first = s.insert_employee(employee("ops@frota.test", false)).await.unwrap();
  let err = core(s.insert_employee(employee("OPS@Frota.test", false)).await.unwrap_err());
  assert!(matches!(err, CoreError::DuplicateEmail { .. }));

  let found = s.employee_by_email("Ops@FROTA.test").await.unwrap().unwrap();
  assert_eq!(found.id, first.id);
}

#[tokio::test]
async fn update_employee_changes_only_given_fields() {
  let s = store().await;
  let e = s.insert_employee(employee("ops@frota.test", false)).await.unwrap();

  let updated = s
    .update_employee(e.id, EmployeeUpdate { is_admin: Some(true), ..Default::default() })
    .await
    .unwrap();
  assert!(updated.is_admin);
  assert!(updated.is_active);
  assert_eq!(updated.full_name, "Ana Souza");

  let err = core(
    s.update_employee(EmployeeId(42), EmployeeUpdate::default())
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::NotFound(Missing::Employee(EmployeeId(42)))));
}

// ─── Persons ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_individual_with_address() {
  let s = store().await;
  let p = s.insert_person(individual("bruno@mail.test")).await.unwrap();
  assert_eq!(p.kind(), PersonKind::Individual);
  assert!(p.is_active);
  assert_eq!(p.address.city, "Curitiba");
  assert_eq!(p.as_individual().unwrap().employer, None);

  let by_email = s.person_by_email("bruno@mail.test").await.unwrap().unwrap();
  assert_eq!(by_email.id, p.id);
}

#[tokio::test]
async fn person_email_scope_is_shared_by_sub_types() {
  let s = store().await;
  s.insert_person(individual("shared@mail.test")).await.unwrap();
  let err = core(
    s.insert_person(organization("shared@mail.test", vec![]))
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::DuplicateEmail { domain: Domain::Person, .. }));
}

#[tokio::test]
async fn email_scopes_are_independent_across_domains() {
  let s = store().await;
  s.insert_employee(employee("same@mail.test", false)).await.unwrap();
  s.insert_person(individual("same@mail.test")).await.unwrap();
  assert!(s.employee_by_email("same@mail.test").await.unwrap().is_some());
  assert!(s.person_by_email("same@mail.test").await.unwrap().is_some());
}

#[tokio::test]
async fn list_persons_filters_by_kind() {
  let s = store().await;
  s.insert_person(individual("a@mail.test")).await.unwrap();
  s.insert_person(individual("b@mail.test")).await.unwrap();
  s.insert_person(organization("c@mail.test", vec![])).await.unwrap();

  assert_eq!(s.list_persons(None).await.unwrap().len(), 3);
  let orgs = s.list_persons(Some(PersonKind::Organizational)).await.unwrap();
  assert_eq!(orgs.len(), 1);
  assert_eq!(orgs[0].email, "c@mail.test");
}

#[tokio::test]
async fn update_person_replaces_data_and_keeps_password() {
  let s = store().await;
  let p = s.insert_person(individual("old@mail.test")).await.unwrap();

  let mut addr = address();
  addr.city = "Londrina".into();
  addr.complement = Some("Apto 3".into());
  let updated = s
    .update_person(p.id, PersonUpdate {
      email:         "new@mail.test".into(),
      phone:         "41988880000".into(),
      password_hash: None,
      address:       addr,
      profile:       ProfileData::Individual {
        full_name:   "Bruno L. Lima".into(),
        national_id: "12345678901".into(),
        license_id:  "11111111111".into(),
      },
    })
    .await
    .unwrap();

  assert_eq!(updated.email, "new@mail.test");
  assert_eq!(updated.address.city, "Londrina");
  assert_eq!(updated.address.address_id, p.address.address_id);
  assert_eq!(updated.password_hash, p.password_hash);
  assert_eq!(updated.as_individual().unwrap().full_name, "Bruno L. Lima");
}

#[tokio::test]
async fn update_person_refuses_other_sub_type_and_taken_email() {
  let s = store().await;
  let ind = s.insert_person(individual("ind@mail.test")).await.unwrap();
  let org = s.insert_person(organization("org@mail.test", vec![])).await.unwrap();

  let as_org = PersonUpdate {
    email:         "ind@mail.test".into(),
    phone:         "1".into(),
    password_hash: None,
    address:       address(),
    profile:       ProfileData::Organizational {
      legal_name: "X".into(),
      trade_name: None,
      tax_id:     "1".into(),
    },
  };
  let err = core(s.update_person(ind.id, as_org).await.unwrap_err());
  assert!(matches!(err, CoreError::NotFound(Missing::Organization(id)) if id == ind.id));

  let steal = individual("org@mail.test");
  let err = core(
    s.update_person(ind.id, PersonUpdate {
      email:         steal.email,
      phone:         steal.phone,
      password_hash: None,
      address:       steal.address,
      profile:       steal.profile,
    })
    .await
    .unwrap_err(),
  );
  assert!(matches!(err, CoreError::DuplicateEmail { domain: Domain::Person, .. }));
  assert_eq!(s.person_by_id(org.id).await.unwrap().unwrap().email, "org@mail.test");
}

#[tokio::test]
async fn set_person_active_blocks_and_unblocks() {
  let s = store().await;
  let p = s.insert_person(individual("x@mail.test")).await.unwrap();
  assert!(!s.set_person_active(p.id, false).await.unwrap().is_active);
  assert!(s.set_person_active(p.id, true).await.unwrap().is_active);

  let err = core(s.set_person_active(PersonId(77), false).await.unwrap_err());
  assert!(matches!(err, CoreError::NotFound(Missing::Person(PersonId(77)))));
}

// ─── Driver associations ─────────────────────────────────────────────────────

#[tokio::test]
async fn associate_sets_both_sides() {
  let s = store().await;
  let org = s.insert_person(organization("org@mail.test", vec![])).await.unwrap();
  let ind = s.insert_person(individual("ind@mail.test")).await.unwrap();

  let link = s.associate_driver(org.id, ind.id).await.unwrap();
  assert_eq!(link.change, LinkChange::Insert);
  assert_eq!(drivers(&s, org.id).await, vec![ind.id]);
  assert_eq!(employer(&s, ind.id).await, Some(org.id));
}

#[tokio::test]
async fn associate_same_pair_twice_is_idempotent() {
  let s = store().await;
  let org = s.insert_person(organization("org@mail.test", vec![])).await.unwrap();
  let ind = s.insert_person(individual("ind@mail.test")).await.unwrap();

  s.associate_driver(org.id, ind.id).await.unwrap();
  let again = s.associate_driver(org.id, ind.id).await.unwrap();
  assert_eq!(again.change, LinkChange::Unchanged);
  assert_eq!(drivers(&s, org.id).await, vec![ind.id]);
  assert_eq!(s.drivers_of(org.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn associate_with_second_organization_conflicts() {
  let s = store().await;
  let a = s.insert_person(organization("a@mail.test", vec![])).await.unwrap();
  let b = s.insert_person(organization("b@mail.test", vec![])).await.unwrap();
  let ind = s.insert_person(individual("ind@mail.test")).await.unwrap();

  s.associate_driver(a.id, ind.id).await.unwrap();
  let err = core(s.associate_driver(b.id, ind.id).await.unwrap_err());
  assert!(matches!(err, CoreError::AssociationConflict { .. }));

  assert_eq!(drivers(&s, a.id).await, vec![ind.id]);
  assert!(drivers(&s, b.id).await.is_empty());
  assert_eq!(employer(&s, ind.id).await, Some(a.id));
}

#[tokio::test]
async fn associate_rejects_missing_or_wrong_sub_type() {
  let s = store().await;
  let org = s.insert_person(organization("org@mail.test", vec![])).await.unwrap();
  let other_org = s.insert_person(organization("o2@mail.test", vec![])).await.unwrap();
  let ind = s.insert_person(individual("ind@mail.test")).await.unwrap();

  let err = core(s.associate_driver(org.id, PersonId(999)).await.unwrap_err());
  assert!(matches!(err, CoreError::NotFound(Missing::Individual(PersonId(999)))));

  let err = core(s.associate_driver(org.id, other_org.id).await.unwrap_err());
  assert!(matches!(err, CoreError::NotFound(Missing::Individual(_))));

  let err = core(s.associate_driver(ind.id, ind.id).await.unwrap_err());
  assert!(matches!(err, CoreError::NotFound(Missing::Organization(_))));
}

#[tokio::test]
async fn remove_driver_clears_both_sides() {
  let s = store().await;
  let org = s.insert_person(organization("org@mail.test", vec![])).await.unwrap();
  let ind = s.insert_person(individual("ind@mail.test")).await.unwrap();
  s.associate_driver(org.id, ind.id).await.unwrap();

  s.remove_driver(org.id, ind.id).await.unwrap();
  assert!(drivers(&s, org.id).await.is_empty());
  assert_eq!(employer(&s, ind.id).await, None);
}

#[tokio::test]
async fn remove_driver_of_another_organization_is_not_associated() {
  let s = store().await;
  let a = s.insert_person(organization("a@mail.test", vec![])).await.unwrap();
  let b = s.insert_person(organization("b@mail.test", vec![])).await.unwrap();
  let ind = s.insert_person(individual("ind@mail.test")).await.unwrap();
  s.associate_driver(a.id, ind.id).await.unwrap();

  let err = core(s.remove_driver(b.id, ind.id).await.unwrap_err());
  assert!(matches!(err, CoreError::NotAssociated { .. }));
  assert_eq!(drivers(&s, a.id).await, vec![ind.id]);
  assert!(drivers(&s, b.id).await.is_empty());

  let err = core(s.remove_driver(b.id, PersonId(555)).await.unwrap_err());
  assert!(matches!(err, CoreError::NotFound(Missing::Individual(PersonId(555)))));
}

#[tokio::test]
async fn organization_created_with_initial_drivers() {
  let s = store().await;
  let d1 = s.insert_person(individual("d1@mail.test")).await.unwrap();
  let d2 = s.insert_person(individual("d2@mail.test")).await.unwrap();

  let org = s
    .insert_person(organization("org@mail.test", vec![d2.id, d1.id]))
    .await
    .unwrap();
  assert_eq!(org.as_organization().unwrap().drivers, vec![d1.id, d2.id]);
  assert_eq!(employer(&s, d1.id).await, Some(org.id));
}

#[tokio::test]
async fn organization_creation_rolls_back_on_driver_conflict() {
  let s = store().await;
  let taken = s.insert_person(individual("d1@mail.test")).await.unwrap();
  let first = s
    .insert_person(organization("first@mail.test", vec![taken.id]))
    .await
    .unwrap();

  let err = core(
    s.insert_person(organization("second@mail.test", vec![taken.id]))
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::AssociationConflict { .. }));
  assert!(s.person_by_email("second@mail.test").await.unwrap().is_none());
  assert_eq!(employer(&s, taken.id).await, Some(first.id));
}

#[tokio::test]
async fn deleting_driver_removes_it_from_organization() {
  let s = store().await;
  let org = s.insert_person(organization("org@mail.test", vec![])).await.unwrap();
  let ind = s.insert_person(individual("ind@mail.test")).await.unwrap();
  s.associate_driver(org.id, ind.id).await.unwrap();

  s.delete_person(ind.id).await.unwrap();
  assert!(s.person_by_id(ind.id).await.unwrap().is_none());
  assert!(drivers(&s, org.id).await.is_empty());
  assert!(s.drivers_of(org.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_organization_releases_its_drivers() {
  let s = store().await;
  let org = s.insert_person(organization("org@mail.test", vec![])).await.unwrap();
  let ind = s.insert_person(individual("ind@mail.test")).await.unwrap();
  s.associate_driver(org.id, ind.id).await.unwrap();

  s.delete_person(org.id).await.unwrap();
  assert_eq!(employer(&s, ind.id).await, None);

  let other = s.insert_person(organization("new@mail.test", vec![])).await.unwrap();
  s.associate_driver(other.id, ind.id).await.unwrap();
}

#[tokio::test]
async fn delete_missing_person_is_not_found() {
  let s = store().await;
  let err = core(s.delete_person(PersonId(3)).await.unwrap_err());
  assert!(matches!(err, CoreError::NotFound(Missing::Person(PersonId(3)))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_associations_admit_one_organization() {
  let s = std::sync::Arc::new(store().await);
  let ind = s.insert_person(individual("contested@mail.test")).await.unwrap();
  let mut orgs = Vec::new();
  for i in 0..8 {
    let org = s
      .insert_person(organization(&format!("org{i}@mail.test"), vec![]))
      .await
      .unwrap();
    orgs.push(org.id);
  }

  let handles: Vec<_> = orgs
    .iter()
    .map(|&org| {
      let s = std::sync::Arc::clone(&s);
      tokio::spawn(async move { s.associate_driver(org, ind.id).await })
    })
    .collect();

  let mut successes = 0;
  let mut conflicts = 0;
  for handle in handles {
    match handle.await.unwrap() {
      Ok(_) => successes += 1,
      Err(e) => {
        assert!(matches!(core(e), CoreError::AssociationConflict { .. }));
        conflicts += 1;
      }
    }
  }
  assert_eq!(successes, 1);
  assert_eq!(conflicts, orgs.len() - 1);

  let mut memberships = 0;
  for &org in &orgs {
    memberships += drivers(&s, org).await.len();
  }
  assert_eq!(memberships, 1);
  let winner = employer(&s, ind.id).await.unwrap();
  assert_eq!(drivers(&s, winner).await, vec![ind.id]);
}
