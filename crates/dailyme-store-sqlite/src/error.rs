//! Error type for `dailyme-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown drink type: {0:?}")]
  UnknownDrinkType(String),

  /// A stored integer does not fit the domain type.
  #[error("value out of range in column {column}: {value}")]
  OutOfRange { column: &'static str, value: i64 },

  #[error("unsupported schema version {found}, expected at most {supported}")]
  SchemaVersion { found: i64, supported: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
