//! SQL schema for the Frota SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Employee email scope.
CREATE TABLE IF NOT EXISTS employees (
    employee_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    full_name     TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    is_active     INTEGER NOT NULL DEFAULT 1,
    is_admin      INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL
);

-- Person email scope, shared by both sub-types.
CREATE TABLE IF NOT EXISTS persons (
    person_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    phone         TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    is_active     INTEGER NOT NULL DEFAULT 1,
    person_kind   TEXT NOT NULL CHECK (person_kind IN ('individual', 'organizational')),
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS addresses (
    address_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    person_id   INTEGER NOT NULL UNIQUE REFERENCES persons(person_id) ON DELETE CASCADE,
    street      TEXT NOT NULL,
    number      TEXT NOT NULL,
    complement  TEXT,
    district    TEXT NOT NULL,
    city        TEXT NOT NULL,
    state       TEXT NOT NULL,
    postal_code TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS individuals (
    person_id   INTEGER PRIMARY KEY REFERENCES persons(person_id) ON DELETE CASCADE,
    full_name   TEXT NOT NULL,
    national_id TEXT NOT NULL,
    license_id  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organizations (
    person_id  INTEGER PRIMARY KEY REFERENCES persons(person_id) ON DELETE CASCADE,
    legal_name TEXT NOT NULL,
    trade_name TEXT,
    tax_id     TEXT NOT NULL
);

-- The single source of truth for driver associations. Keyed by the
-- individual, so each individual has at most one employer.
CREATE TABLE IF NOT EXISTS driver_links (
    individual_id   INTEGER PRIMARY KEY REFERENCES individuals(person_id) ON DELETE CASCADE,
    organization_id INTEGER NOT NULL REFERENCES organizations(person_id) ON DELETE CASCADE,
    linked_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS driver_links_org_idx ON driver_links(organization_id);

PRAGMA user_version = 1;
";
