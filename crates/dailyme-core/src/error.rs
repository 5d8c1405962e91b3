//! Error types for `dailyme-core`.
//!
//! Storage backends have their own error enums. The state containers classify
//! a backend failure by the kind of operation that produced it.

use thiserror::Error;

use crate::{entry::EntryId, settings::SettingKey};

/// A backend error, type-erased so the core stays backend-agnostic.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
  /// The store could not be opened.
  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] BoxError),

  /// A put or delete was rejected (quota, corruption, closed connection).
  #[error("write failed: {0}")]
  WriteFailure(#[source] BoxError),

  #[error("read failed: {0}")]
  ReadFailure(#[source] BoxError),

  #[error("amount must be a positive number of millilitres, got {0}")]
  InvalidAmount(u32),

  #[error("invalid value for {key}: {reason}")]
  InvalidSetting { key: SettingKey, reason: String },

  #[error("entry not found: {0}")]
  EntryNotFound(EntryId),

  #[error("invalid date {0:?}, expected YYYY-MM-DD")]
  InvalidDate(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn unavailable<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StorageUnavailable(Box::new(err))
  }

  pub fn write<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::WriteFailure(Box::new(err))
  }

  pub fn read<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::ReadFailure(Box::new(err))
  }

  /// Whether this error came from the storage layer rather than from input
  /// validation.
  pub fn is_storage(&self) -> bool {
    matches!(
      self,
      Self::StorageUnavailable(_) | Self::WriteFailure(_) | Self::ReadFailure(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
