//! Fixtures shared by the unit tests in this crate.

use frota_core::{
  principal::{Employee, NewAddress, NewEmployee, NewPerson, Person, ProfileData},
  store::PrincipalStore,
};
use frota_store_sqlite::SqliteStore;

use crate::CredentialService;

fn address() -> NewAddress {
  NewAddress {
    street:      "Av. Brasil".into(),
    number:      "500".into(),
    complement:  None,
    district:    "Centro".into(),
    city:        "Maringá".into(),
    state:       "PR".into(),
    postal_code: "87013000".into(),
  }
}

pub async fn employee(
  store: &SqliteStore,
  creds: &CredentialService,
  email: &str,
  active: bool,
  admin: bool,
) -> Employee {
  store
    .insert_employee(NewEmployee {
      email:         email.into(),
      full_name:     "Carla Dias".into(),
      password_hash: creds.hash("employee-pass").unwrap(),
      is_active:     active,
      is_admin:      admin,
    })
    .await
    .unwrap()
}

pub async fn individual(
  store: &SqliteStore,
  creds: &CredentialService,
  email: &str,
  password: &str,
) -> Person {
  store
    .insert_person(NewPerson {
      email:           email.into(),
      phone:           "44999990000".into(),
      password_hash:   creds.hash(password).unwrap(),
      address:         address(),
      profile:         ProfileData::Individual {
        full_name:   "Davi Rocha".into(),
        national_id: "11122233344".into(),
        license_id:  "55566677788".into(),
      },
      initial_drivers: vec![],
    })
    .await
    .unwrap()
}

pub async fn organization(
  store: &SqliteStore,
  creds: &CredentialService,
  email: &str,
  password: &str,
) -> Person {
  store
    .insert_person(NewPerson {
      email:           email.into(),
      phone:           "4430300000".into(),
      password_hash:   creds.hash(password).unwrap(),
      address:         address(),
      profile:         ProfileData::Organizational {
        legal_name: "Cargas Norte SA".into(),
        trade_name: None,
        tax_id:     "99888777000166".into(),
      },
      initial_drivers: vec![],
    })
    .await
    .unwrap()
}
