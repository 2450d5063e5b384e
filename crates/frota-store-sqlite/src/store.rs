//! [`SqliteStore`], the SQLite implementation of [`PrincipalStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};

use frota_core::{
  Domain,
  error::Missing,
  principal::{
    Employee, EmployeeId, EmployeeUpdate, NewAddress, NewEmployee, NewPerson, Person, PersonId,
    PersonKind, PersonUpdate, ProfileData,
  },
  relationship::{DriverLink, LinkChange, LinkSnapshot, plan_associate, plan_remove},
  store::PrincipalStore,
};

use crate::{
  Result,
  encode::{
    EMPLOYEE_COLUMNS, PERSON_SELECT, RawEmployee, RawPerson, SqlKind, encode_dt,
    encode_person_kind,
  },
  schema::SCHEMA,
};

/// Result of the domain checks made inside a connection closure. The outer
/// `tokio_rusqlite::Result` carries database failures; this one carries rule
/// violations, which roll the transaction back by dropping it.
type Outcome<T> = std::result::Result<T, frota_core::Error>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A principal store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// are serialised on the connection's thread, and every mutation runs in an
/// `IMMEDIATE` transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Connection-side helpers ─────────────────────────────────────────────────

fn email_taken(
  conn: &Connection,
  table: &str,
  id_column: &str,
  email: &str,
  except: Option<i64>,
) -> rusqlite::Result<bool> {
  let sql =
    format!("SELECT 1 FROM {table} WHERE email = ?1 AND (?2 IS NULL OR {id_column} != ?2)");
  Ok(
    conn
      .query_row(&sql, params![email, except], |_| Ok(true))
      .optional()?
      .unwrap_or(false),
  )
}

fn read_employee(conn: &Connection, id: i64) -> rusqlite::Result<Option<RawEmployee>> {
  conn
    .query_row(
      &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_id = ?1"),
      params![id],
      RawEmployee::from_row,
    )
    .optional()
}

fn driver_ids(conn: &Connection, organization: i64) -> rusqlite::Result<Vec<i64>> {
  let mut stmt = conn.prepare(
    "SELECT individual_id FROM driver_links WHERE organization_id = ?1 ORDER BY individual_id",
  )?;
  let ids = stmt
    .query_map(params![organization], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(ids)
}

fn with_drivers(conn: &Connection, mut raw: RawPerson) -> rusqlite::Result<RawPerson> {
  if raw.is_organization() {
    raw.drivers = driver_ids(conn, raw.person_id)?;
  }
  Ok(raw)
}

fn read_person(conn: &Connection, id: i64) -> rusqlite::Result<Option<RawPerson>> {
  conn
    .query_row(
      &format!("{PERSON_SELECT} WHERE p.person_id = ?1"),
      params![id],
      RawPerson::from_row,
    )
    .optional()?
    .map(|raw| with_drivers(conn, raw))
    .transpose()
}

fn read_persons(
  conn: &Connection,
  where_clause: &str,
  param: Option<rusqlite::types::Value>,
) -> rusqlite::Result<Vec<RawPerson>> {
  let mut stmt = conn.prepare(&format!("{PERSON_SELECT} {where_clause} ORDER BY p.person_id"))?;
  let rows = stmt
    .query_map(params![param], RawPerson::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  rows.into_iter().map(|raw| with_drivers(conn, raw)).collect()
}

fn person_kind(conn: &Connection, id: PersonId) -> rusqlite::Result<Option<PersonKind>> {
  Ok(
    conn
      .query_row(
        "SELECT person_kind FROM persons WHERE person_id = ?1",
        params![id.0],
        |row| row.get::<_, SqlKind>(0),
      )
      .optional()?
      .map(|SqlKind(kind)| kind),
  )
}

fn link_snapshot(
  conn: &Connection,
  organization: PersonId,
  individual: PersonId,
) -> rusqlite::Result<LinkSnapshot> {
  let employer = conn
    .query_row(
      "SELECT organization_id FROM driver_links WHERE individual_id = ?1",
      params![individual.0],
      |row| row.get(0),
    )
    .optional()?
    .map(PersonId);

  Ok(LinkSnapshot {
    organization: person_kind(conn, organization)?,
    individual: person_kind(conn, individual)?,
    employer,
  })
}

fn insert_link(
  conn: &Connection,
  organization: PersonId,
  individual: PersonId,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO driver_links (individual_id, organization_id, linked_at) VALUES (?1, ?2, ?3)",
    params![individual.0, organization.0, encode_dt(Utc::now())],
  )?;
  Ok(())
}

fn write_address(conn: &Connection, person_id: i64, a: &NewAddress) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO addresses
       (person_id, street, number, complement, district, city, state, postal_code)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
     ON CONFLICT (person_id) DO UPDATE SET
       street = excluded.street, number = excluded.number,
       complement = excluded.complement, district = excluded.district,
       city = excluded.city, state = excluded.state,
       postal_code = excluded.postal_code",
    params![
      person_id,
      a.street,
      a.number,
      a.complement,
      a.district,
      a.city,
      a.state,
      a.postal_code,
    ],
  )?;
  Ok(())
}

fn write_profile(conn: &Connection, person_id: i64, profile: &ProfileData) -> rusqlite::Result<()> {
  match profile {
    ProfileData::Individual { full_name, national_id, license_id } => {
      conn.execute(
        "INSERT INTO individuals (person_id, full_name, national_id, license_id)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (person_id) DO UPDATE SET
           full_name = excluded.full_name, national_id = excluded.national_id,
           license_id = excluded.license_id",
        params![person_id, full_name, national_id, license_id],
      )?;
    }
    ProfileData::Organizational { legal_name, trade_name, tax_id } => {
      conn.execute(
        "INSERT INTO organizations (person_id, legal_name, trade_name, tax_id)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (person_id) DO UPDATE SET
           legal_name = excluded.legal_name, trade_name = excluded.trade_name,
           tax_id = excluded.tax_id",
        params![person_id, legal_name, trade_name, tax_id],
      )?;
    }
  }
  Ok(())
}

fn missing_of_kind(kind: PersonKind, id: PersonId) -> Missing {
  match kind {
    PersonKind::Individual => Missing::Individual(id),
    PersonKind::Organizational => Missing::Organization(id),
  }
}

/// A row that was just written in the same transaction must be readable.
fn written<T>(row: Option<T>) -> rusqlite::Result<T> {
  row.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

// ─── PrincipalStore impl ─────────────────────────────────────────────────────

impl PrincipalStore for SqliteStore {
  type Error = crate::Error;

  // ── Employees ─────────────────────────────────────────────────────────────

  async fn insert_employee(&self, input: NewEmployee) -> Result<Employee> {
    let created_at = encode_dt(Utc::now());

    let raw: Outcome<RawEmployee> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if email_taken(&tx, "employees", "employee_id", &input.email, None)? {
          return Ok(Err(frota_core::Error::DuplicateEmail {
            domain: Domain::Employee,
            email:  input.email,
          }));
        }

        tx.execute(
          "INSERT INTO employees
             (email, full_name, password_hash, is_active, is_admin, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![
            input.email,
            input.full_name,
            input.password_hash,
            input.is_active,
            input.is_admin,
            created_at,
          ],
        )?;
        let raw = written(read_employee(&tx, tx.last_insert_rowid())?)?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    let employee = raw?.into_employee()?;
    tracing::info!(id = %employee.id, admin = employee.is_admin, "employee created");
    Ok(employee)
  }

  async fn employee_by_id(&self, id: EmployeeId) -> Result<Option<Employee>> {
    let raw = self
      .conn
      .call(move |conn| Ok(read_employee(conn, id.0)?))
      .await?;
    raw.map(RawEmployee::into_employee).transpose()
  }

  async fn employee_by_email(&self, email: &str) -> Result<Option<Employee>> {
    let email = email.to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE email = ?1"),
              params![email],
              RawEmployee::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawEmployee::into_employee).transpose()
  }

  async fn list_employees(&self) -> Result<Vec<Employee>> {
    let raws: Vec<RawEmployee> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY employee_id"
        ))?;
        let rows = stmt
          .query_map([], RawEmployee::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEmployee::into_employee).collect()
  }

  async fn update_employee(&self, id: EmployeeId, update: EmployeeUpdate) -> Result<Employee> {
    let raw: Outcome<RawEmployee> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(current) = read_employee(&tx, id.0)? else {
          return Ok(Err(frota_core::Error::NotFound(Missing::Employee(id))));
        };

        tx.execute(
          "UPDATE employees SET full_name = ?2, is_active = ?3, is_admin = ?4
           WHERE employee_id = ?1",
          params![
            id.0,
            update.full_name.unwrap_or(current.full_name),
            update.is_active.unwrap_or(current.is_active),
            update.is_admin.unwrap_or(current.is_admin),
          ],
        )?;
        let raw = written(read_employee(&tx, id.0)?)?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    let employee = raw?.into_employee()?;
    tracing::info!(
      %id,
      active = employee.is_active,
      admin = employee.is_admin,
      "employee updated"
    );
    Ok(employee)
  }

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn insert_person(&self, input: NewPerson) -> Result<Person> {
    let created_at = encode_dt(Utc::now());

    let raw: Outcome<RawPerson> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if email_taken(&tx, "persons", "person_id", &input.email, None)? {
          return Ok(Err(frota_core::Error::DuplicateEmail {
            domain: Domain::Person,
            email:  input.email,
          }));
        }

        tx.execute(
          "INSERT INTO persons
             (email, phone, password_hash, is_active, person_kind, created_at)
           VALUES (?1, ?2, ?3, 1, ?4, ?5)",
          params![
            input.email,
            input.phone,
            input.password_hash,
            encode_person_kind(input.profile.kind()),
            created_at,
          ],
        )?;
        let person_id = tx.last_insert_rowid();
        write_address(&tx, person_id, &input.address)?;
        write_profile(&tx, person_id, &input.profile)?;

        let organization = PersonId(person_id);
        for &driver in &input.initial_drivers {
          let snapshot = link_snapshot(&tx, organization, driver)?;
          match plan_associate(organization, driver, &snapshot) {
            Ok(LinkChange::Insert) => insert_link(&tx, organization, driver)?,
            Ok(LinkChange::Unchanged) => {}
            Err(refusal) => return Ok(Err(refusal)),
          }
        }

        let raw = written(read_person(&tx, person_id)?)?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    let person = raw?.into_person()?;
    tracing::info!(id = %person.id, kind = %person.kind(), "person created");
    Ok(person)
  }

  async fn person_by_id(&self, id: PersonId) -> Result<Option<Person>> {
    let raw = self
      .conn
      .call(move |conn| Ok(read_person(conn, id.0)?))
      .await?;
    raw.map(RawPerson::into_person).transpose()
  }

  async fn person_by_email(&self, email: &str) -> Result<Option<Person>> {
    let email = email.to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        let rows = read_persons(conn, "WHERE p.email = ?1", Some(email.into()))?;
        Ok(rows.into_iter().next())
      })
      .await?;
    raw.map(RawPerson::into_person).transpose()
  }

  async fn list_persons(&self, kind: Option<PersonKind>) -> Result<Vec<Person>> {
    let kind_param: Option<rusqlite::types::Value> =
      kind.map(|k| encode_person_kind(k).to_owned().into());
    let raws = self
      .conn
      .call(move |conn| {
        Ok(read_persons(conn, "WHERE (?1 IS NULL OR p.person_kind = ?1)", kind_param)?)
      })
      .await?;
    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn update_person(&self, id: PersonId, update: PersonUpdate) -> Result<Person> {
    let raw: Outcome<RawPerson> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let kind = update.profile.kind();
        if person_kind(&tx, id)? != Some(kind) {
          return Ok(Err(frota_core::Error::NotFound(missing_of_kind(kind, id))));
        }
        if email_taken(&tx, "persons", "person_id", &update.email, Some(id.0))? {
          return Ok(Err(frota_core::Error::DuplicateEmail {
            domain: Domain::Person,
            email:  update.email,
          }));
        }

        tx.execute(
          "UPDATE persons SET
             email = ?2, phone = ?3, password_hash = COALESCE(?4, password_hash)
           WHERE person_id = ?1",
          params![id.0, update.email, update.phone, update.password_hash],
        )?;
        write_address(&tx, id.0, &update.address)?;
        write_profile(&tx, id.0, &update.profile)?;

        let raw = written(read_person(&tx, id.0)?)?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    let person = raw?.into_person()?;
    tracing::info!(id = %person.id, "person updated");
    Ok(person)
  }

  async fn set_person_active(&self, id: PersonId, active: bool) -> Result<Person> {
    let raw: Outcome<RawPerson> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
          "UPDATE persons SET is_active = ?2 WHERE person_id = ?1",
          params![id.0, active],
        )?;
        if changed == 0 {
          return Ok(Err(frota_core::Error::NotFound(Missing::Person(id))));
        }
        let raw = written(read_person(&tx, id.0)?)?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    let person = raw?.into_person()?;
    tracing::info!(%id, active, "person activation changed");
    Ok(person)
  }

  async fn delete_person(&self, id: PersonId) -> Result<()> {
    // Address, sub-type row and driver links go with the person through
    // ON DELETE CASCADE.
    let outcome: Outcome<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let deleted = tx.execute("DELETE FROM persons WHERE person_id = ?1", params![id.0])?;
        if deleted == 0 {
          return Ok(Err(frota_core::Error::NotFound(Missing::Person(id))));
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome?;
    tracing::info!(%id, "person deleted");
    Ok(())
  }

  // ── Driver associations ───────────────────────────────────────────────────

  async fn associate_driver(
    &self,
    organization: PersonId,
    individual: PersonId,
  ) -> Result<DriverLink> {
    let change: Outcome<LinkChange> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let snapshot = link_snapshot(&tx, organization, individual)?;
        let change = match plan_associate(organization, individual, &snapshot) {
          Ok(change) => change,
          Err(refusal) => return Ok(Err(refusal)),
        };
        if change == LinkChange::Insert {
          insert_link(&tx, organization, individual)?;
        }
        tx.commit()?;
        Ok(Ok(change))
      })
      .await?;

    Ok(DriverLink { organization, individual, change: change? })
  }

  async fn remove_driver(&self, organization: PersonId, individual: PersonId) -> Result<()> {
    let outcome: Outcome<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let snapshot = link_snapshot(&tx, organization, individual)?;
        if let Err(refusal) = plan_remove(organization, individual, &snapshot) {
          return Ok(Err(refusal));
        }
        tx.execute(
          "DELETE FROM driver_links WHERE individual_id = ?1 AND organization_id = ?2",
          params![individual.0, organization.0],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    Ok(outcome?)
  }

  async fn drivers_of(&self, organization: PersonId) -> Result<Vec<Person>> {
    let raws: Outcome<Vec<RawPerson>> = self
      .conn
      .call(move |conn| {
        if person_kind(conn, organization)? != Some(PersonKind::Organizational) {
          return Ok(Err(frota_core::Error::NotFound(Missing::Organization(organization))));
        }
        let rows = read_persons(
          conn,
          "WHERE l.organization_id = ?1",
          Some(organization.0.into()),
        )?;
        Ok(Ok(rows))
      })
      .await?;

    raws?.into_iter().map(RawPerson::into_person).collect()
  }
}
