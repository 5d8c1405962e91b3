//! Log entries — one drink, logged against a logical day.
//!
//! Entries are immutable once created. They are removed either one at a time
//! or in bulk when a day is reset.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque entry identifier. Carries no ordering; entries are ordered by
/// timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }

  pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl Default for EntryId {
  fn default() -> Self { Self::new() }
}

impl From<Uuid> for EntryId {
  fn from(id: Uuid) -> Self { Self(id) }
}

impl fmt::Display for EntryId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.hyphenated())
  }
}

impl FromStr for EntryId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self(Uuid::parse_str(s)?)) }
}

// ─── Drink type ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrinkType {
  #[default]
  Water,
  Tea,
  Coffee,
  Other,
}

impl DrinkType {
  pub const ALL: [DrinkType; 4] = [Self::Water, Self::Tea, Self::Coffee, Self::Other];

  /// Storage discriminant.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Water => "water",
      Self::Tea => "tea",
      Self::Coffee => "coffee",
      Self::Other => "other",
    }
  }

  /// Human-readable label.
  pub fn label(self) -> &'static str {
    match self {
      Self::Water => "Water",
      Self::Tea => "Tea",
      Self::Coffee => "Coffee",
      Self::Other => "Other",
    }
  }
}

impl fmt::Display for DrinkType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for DrinkType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| format!("unknown drink type: {s:?}"))
  }
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A single logged drink.
///
/// The serialized shape (`id, date, timestamp, amount_ml, type`) is the
/// export format and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
  pub id:        EntryId,
  /// Logical day this entry counts against.
  pub date:      NaiveDate,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp: DateTime<Utc>,
  pub amount_ml: u32,
  #[serde(rename = "type")]
  pub kind:      DrinkType,
}

impl LogEntry {
  /// Build an entry with a fresh id. Rejects zero amounts.
  pub fn new(
    date: NaiveDate,
    timestamp: DateTime<Utc>,
    amount_ml: u32,
    kind: DrinkType,
  ) -> Result<Self> {
    if amount_ml == 0 {
      return Err(Error::InvalidAmount(amount_ml));
    }
    Ok(Self { id: EntryId::new(), date, timestamp, amount_ml, kind })
  }
}
