//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, person kinds as their lowercase
//! names and flags as integers.

use chrono::{DateTime, Utc};
use frota_core::principal::{
  Address, Employee, EmployeeId, Individual, Organization, Person, PersonId, PersonKind,
  Profile,
};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── PersonKind ──────────────────────────────────────────────────────────────

pub fn encode_person_kind(k: PersonKind) -> &'static str { k.as_str() }

pub fn decode_person_kind(s: &str) -> Option<PersonKind> {
  match s {
    "individual" => Some(PersonKind::Individual),
    "organizational" => Some(PersonKind::Organizational),
    _ => None,
  }
}

/// Column adapter so kinds can be read inside a connection closure.
pub struct SqlKind(pub PersonKind);

impl FromSql for SqlKind {
  fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
    let s = value.as_str()?;
    decode_person_kind(s)
      .map(SqlKind)
      .ok_or_else(|| FromSqlError::Other(format!("unknown person kind: {s:?}").into()))
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const EMPLOYEE_COLUMNS: &str =
  "employee_id, email, full_name, password_hash, is_active, is_admin, created_at";

/// Raw values read directly from an `employees` row.
pub struct RawEmployee {
  pub employee_id:   i64,
  pub email:         String,
  pub full_name:     String,
  pub password_hash: String,
  pub is_active:     bool,
  pub is_admin:      bool,
  pub created_at:    String,
}

impl RawEmployee {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      employee_id:   row.get(0)?,
      email:         row.get(1)?,
      full_name:     row.get(2)?,
      password_hash: row.get(3)?,
      is_active:     row.get(4)?,
      is_admin:      row.get(5)?,
      created_at:    row.get(6)?,
    })
  }

  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      id:            EmployeeId(self.employee_id),
      email:         self.email,
      full_name:     self.full_name,
      password_hash: self.password_hash,
      is_active:     self.is_active,
      is_admin:      self.is_admin,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Select list shared by every person query. Sub-type tables are LEFT
/// JOINed; exactly one of them has a row for any given person.
pub const PERSON_SELECT: &str = "
  SELECT
    p.person_id, p.email, p.phone, p.password_hash, p.is_active,
    p.person_kind, p.created_at,
    a.address_id, a.street, a.number, a.complement, a.district,
    a.city, a.state, a.postal_code,
    i.full_name, i.national_id, i.license_id, l.organization_id,
    o.legal_name, o.trade_name, o.tax_id
  FROM persons p
  JOIN addresses          a ON a.person_id     = p.person_id
  LEFT JOIN individuals   i ON i.person_id     = p.person_id
  LEFT JOIN organizations o ON o.person_id     = p.person_id
  LEFT JOIN driver_links  l ON l.individual_id = p.person_id";

/// Raw values read from a [`PERSON_SELECT`] row plus the driver ids of an
/// organization.
pub struct RawPerson {
  pub person_id:     i64,
  pub email:         String,
  pub phone:         String,
  pub password_hash: String,
  pub is_active:     bool,
  pub person_kind:   String,
  pub created_at:    String,
  pub address:       Address,
  // individuals
  pub full_name:     Option<String>,
  pub national_id:   Option<String>,
  pub license_id:    Option<String>,
  pub employer:      Option<i64>,
  // organizations
  pub legal_name:    Option<String>,
  pub trade_name:    Option<String>,
  pub tax_id:        Option<String>,
  pub drivers:       Vec<i64>,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:     row.get(0)?,
      email:         row.get(1)?,
      phone:         row.get(2)?,
      password_hash: row.get(3)?,
      is_active:     row.get(4)?,
      person_kind:   row.get(5)?,
      created_at:    row.get(6)?,
      address:       Address {
        address_id:  row.get(7)?,
        street:      row.get(8)?,
        number:      row.get(9)?,
        complement:  row.get(10)?,
        district:    row.get(11)?,
        city:        row.get(12)?,
        state:       row.get(13)?,
        postal_code: row.get(14)?,
      },
      full_name:     row.get(15)?,
      national_id:   row.get(16)?,
      license_id:    row.get(17)?,
      employer:      row.get(18)?,
      legal_name:    row.get(19)?,
      trade_name:    row.get(20)?,
      tax_id:        row.get(21)?,
      drivers:       Vec::new(),
    })
  }

  pub fn is_organization(&self) -> bool {
    decode_person_kind(&self.person_kind) == Some(PersonKind::Organizational)
  }

  pub fn into_person(self) -> Result<Person> {
    let id = self.person_id;
    let missing = |column: &str| Error::Decode(format!("person {id} has no {column}"));

    let profile = match decode_person_kind(&self.person_kind) {
      Some(PersonKind::Individual) => Profile::Individual(Individual {
        full_name:   self.full_name.ok_or_else(|| missing("full_name"))?,
        national_id: self.national_id.ok_or_else(|| missing("national_id"))?,
        license_id:  self.license_id.ok_or_else(|| missing("license_id"))?,
        employer:    self.employer.map(PersonId),
      }),
      Some(PersonKind::Organizational) => Profile::Organizational(Organization {
        legal_name: self.legal_name.ok_or_else(|| missing("legal_name"))?,
        trade_name: self.trade_name,
        tax_id:     self.tax_id.ok_or_else(|| missing("tax_id"))?,
        drivers:    self.drivers.into_iter().map(PersonId).collect(),
      }),
      None => {
        return Err(Error::Decode(format!("unknown person kind: {:?}", self.person_kind)));
      }
    };

    Ok(Person {
      id: PersonId(id),
      email: self.email,
      phone: self.phone,
      password_hash: self.password_hash,
      is_active: self.is_active,
      created_at: decode_dt(&self.created_at)?,
      address: self.address,
      profile,
    })
  }
}
