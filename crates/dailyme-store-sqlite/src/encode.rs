//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Logical days are stored as `YYYY-MM-DD` text, instants as epoch
//! milliseconds, ids as hyphenated lowercase UUIDs and setting values as
//! compact JSON.

use chrono::{DateTime, NaiveDate, Utc};
use dailyme_core::{
  date::DATE_FORMAT,
  entry::{DrinkType, EntryId, LogEntry},
  summary::DailySummary,
};

use crate::{Error, Result};

// ─── EntryId ─────────────────────────────────────────────────────────────────

pub fn encode_id(id: EntryId) -> String { id.to_string() }

pub fn decode_id(s: &str) -> Result<EntryId> { Ok(s.parse()?) }

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_ms(dt: DateTime<Utc>) -> i64 { dt.timestamp_millis() }

pub fn decode_ms(ms: i64) -> Result<DateTime<Utc>> {
  DateTime::<Utc>::from_timestamp_millis(ms)
    .ok_or_else(|| Error::DateParse(format!("timestamp out of range: {ms}")))
}

// ─── DrinkType ───────────────────────────────────────────────────────────────

pub fn encode_drink_type(kind: DrinkType) -> &'static str { kind.as_str() }

pub fn decode_drink_type(s: &str) -> Result<DrinkType> {
  s.parse().map_err(|_| Error::UnknownDrinkType(s.to_owned()))
}

// ─── Integers ────────────────────────────────────────────────────────────────

fn decode_u32(column: &'static str, value: i64) -> Result<u32> {
  u32::try_from(value).map_err(|_| Error::OutOfRange { column, value })
}

fn decode_u64(column: &'static str, value: i64) -> Result<u64> {
  u64::try_from(value).map_err(|_| Error::OutOfRange { column, value })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawEntry::from_row`].
pub const ENTRY_COLUMNS: &str = "id, date, timestamp, amount_ml, type";

/// Raw values read directly from a `hydration_logs` row.
pub struct RawEntry {
  pub id:        String,
  pub date:      String,
  pub timestamp: i64,
  pub amount_ml: i64,
  pub kind:      String,
}

impl RawEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      date:      row.get(1)?,
      timestamp: row.get(2)?,
      amount_ml: row.get(3)?,
      kind:      row.get(4)?,
    })
  }

  pub fn into_entry(self) -> Result<LogEntry> {
    Ok(LogEntry {
      id:        decode_id(&self.id)?,
      date:      decode_date(&self.date)?,
      timestamp: decode_ms(self.timestamp)?,
      amount_ml: decode_u32("amount_ml", self.amount_ml)?,
      kind:      decode_drink_type(&self.kind)?,
    })
  }
}

/// Column list matching [`RawSummary::from_row`].
pub const SUMMARY_COLUMNS: &str =
  "date, total_ml, goal_ml, entries_count, goal_reached, last_updated";

/// Raw values read directly from a `daily_summaries` row.
pub struct RawSummary {
  pub date:          String,
  pub total_ml:      i64,
  pub goal_ml:       i64,
  pub entries_count: i64,
  pub goal_reached:  bool,
  pub last_updated:  i64,
}

impl RawSummary {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      date:          row.get(0)?,
      total_ml:      row.get(1)?,
      goal_ml:       row.get(2)?,
      entries_count: row.get(3)?,
      goal_reached:  row.get(4)?,
      last_updated:  row.get(5)?,
    })
  }

  pub fn into_summary(self) -> Result<DailySummary> {
    Ok(DailySummary {
      date:          decode_date(&self.date)?,
      total_ml:      decode_u64("total_ml", self.total_ml)?,
      goal_ml:       decode_u32("goal_ml", self.goal_ml)?,
      entries_count: decode_u32("entries_count", self.entries_count)?,
      goal_reached:  self.goal_reached,
      last_updated:  decode_ms(self.last_updated)?,
    })
  }
}
