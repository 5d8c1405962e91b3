//! [`SqliteStore`] — the SQLite implementation of [`HydrationStore`].

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;
use serde_json::Value;
use tracing::debug;

use dailyme_core::{
  entry::{EntryId, LogEntry},
  settings::{SettingKey, Settings},
  store::HydrationStore,
  summary::DailySummary,
};

use crate::{
  Error, Result,
  encode::{
    ENTRY_COLUMNS, RawEntry, RawSummary, SUMMARY_COLUMNS, encode_date, encode_drink_type,
    encode_id, encode_ms,
  },
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A hydration store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
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

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let found: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
      .await?;
    if found > SCHEMA_VERSION {
      return Err(Error::SchemaVersion { found, supported: SCHEMA_VERSION });
    }

    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!(from = found, to = SCHEMA_VERSION, "schema ready");
    Ok(())
  }

  /// Run a `SELECT` over `hydration_logs` with the given `WHERE`/`ORDER BY`
  /// tail and decode every row.
  async fn query_entries(&self, tail: &'static str, date: Option<String>) -> Result<Vec<LogEntry>> {
    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM hydration_logs {tail}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = match date {
          Some(d) => stmt
            .query_map(rusqlite::params![d], RawEntry::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([], RawEntry::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }
}

// ─── HydrationStore impl ─────────────────────────────────────────────────────

impl HydrationStore for SqliteStore {
  type Error = Error;

  // ── Entries ───────────────────────────────────────────────────────────────

  async fn put_entry(&self, entry: LogEntry) -> Result<()> {
    let id_str   = encode_id(entry.id);
    let date_str = encode_date(entry.date);
    let ts       = encode_ms(entry.timestamp);
    let amount   = i64::from(entry.amount_ml);
    let kind_str = encode_drink_type(entry.kind);

    // Upsert in place so a replaced row keeps its rowid, and with it its
    // position among entries sharing a timestamp.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO hydration_logs (id, date, timestamp, amount_ml, type)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (id) DO UPDATE SET
             date      = excluded.date,
             timestamp = excluded.timestamp,
             amount_ml = excluded.amount_ml,
             type      = excluded.type",
          rusqlite::params![id_str, date_str, ts, amount, kind_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_entry(&self, id: EntryId) -> Result<Option<LogEntry>> {
    let id_str = encode_id(id);

    let raw: Option<RawEntry> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("DELETE FROM hydration_logs WHERE id = ?1 RETURNING {ENTRY_COLUMNS}"),
              rusqlite::params![id_str],
              RawEntry::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEntry::into_entry).transpose()
  }

  async fn entries_for_date(&self, date: NaiveDate) -> Result<Vec<LogEntry>> {
    self
      .query_entries("WHERE date = ?1 ORDER BY timestamp, rowid", Some(encode_date(date)))
      .await
  }

  async fn all_entries(&self) -> Result<Vec<LogEntry>> {
    self.query_entries("ORDER BY timestamp, rowid", None).await
  }

  async fn delete_all_for_date(&self, date: NaiveDate) -> Result<u64> {
    let date_str = encode_date(date);

    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let removed =
          tx.execute("DELETE FROM hydration_logs WHERE date = ?1", rusqlite::params![date_str])?;
        tx.commit()?;
        Ok(removed)
      })
      .await?;
    Ok(removed as u64)
  }

  // ── Summaries ─────────────────────────────────────────────────────────────

  async fn upsert_summary(&self, summary: DailySummary) -> Result<()> {
    let date_str = encode_date(summary.date);
    let total    = i64::try_from(summary.total_ml)
      .map_err(|_| Error::OutOfRange { column: "total_ml", value: i64::MAX })?;
    let goal     = i64::from(summary.goal_ml);
    let count    = i64::from(summary.entries_count);
    let reached  = summary.goal_reached;
    let updated  = encode_ms(summary.last_updated);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO daily_summaries
             (date, total_ml, goal_ml, entries_count, goal_reached, last_updated)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (date) DO UPDATE SET
             total_ml      = excluded.total_ml,
             goal_ml       = excluded.goal_ml,
             entries_count = excluded.entries_count,
             goal_reached  = excluded.goal_reached,
             last_updated  = excluded.last_updated",
          rusqlite::params![date_str, total, goal, count, reached, updated],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>> {
    let date_str = encode_date(date);

    let raw: Option<RawSummary> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SUMMARY_COLUMNS} FROM daily_summaries WHERE date = ?1"),
              rusqlite::params![date_str],
              RawSummary::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSummary::into_summary).transpose()
  }

  async fn get_summaries<'a>(
    &'a self,
    dates: &'a [NaiveDate],
  ) -> Result<Vec<Option<DailySummary>>> {
    let date_strs: Vec<String> = dates.iter().copied().map(encode_date).collect();

    // One read transaction so the rows come from a single snapshot.
    let raws: Vec<Option<RawSummary>> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let rows = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM daily_summaries WHERE date = ?1"
          ))?;
          date_strs
            .iter()
            .map(|d| stmt.query_row(rusqlite::params![d], RawSummary::from_row).optional())
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|raw| raw.map(RawSummary::into_summary).transpose())
      .collect()
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  async fn get_setting(&self, key: SettingKey) -> Result<Option<Value>> {
    let key_str = key.as_str();

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM settings WHERE key = ?1",
              rusqlite::params![key_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(|s| serde_json::from_str(&s)).transpose()?)
  }

  async fn set_setting(&self, key: SettingKey, value: Value) -> Result<()> {
    let key_str   = key.as_str();
    let value_str = serde_json::to_string(&value)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO settings (key, value) VALUES (?1, ?2)
           ON CONFLICT (key) DO UPDATE SET value = excluded.value",
          rusqlite::params![key_str, value_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn init_defaults(&self) -> Result<bool> {
    let defaults = Settings::default()
      .to_values()
      .into_iter()
      .map(|(key, value)| -> Result<(&'static str, String)> {
        Ok((key.as_str(), serde_json::to_string(&value)?))
      })
      .collect::<Result<Vec<_>>>()?;

    // Check and write in one transaction so two openers cannot both decide
    // the defaults are missing.
    let wrote = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let present = tx
          .query_row(
            "SELECT 1 FROM settings WHERE key = ?1",
            rusqlite::params![SettingKey::SENTINEL.as_str()],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !present {
          let mut stmt = tx.prepare("INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)")?;
          for (key, value) in &defaults {
            stmt.execute(rusqlite::params![key, value])?;
          }
        }
        tx.commit()?;
        Ok(!present)
      })
      .await?;

    if wrote {
      debug!("wrote default settings");
    }
    Ok(wrote)
  }
}
