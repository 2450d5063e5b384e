//! Error type for `frota-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain rule refused the operation (duplicate email, missing
  /// principal, association conflict).
  #[error(transparent)]
  Core(#[from] frota_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unexpected column value: {0}")]
  Decode(String),
}

impl From<Error> for frota_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => frota_core::Error::store(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
