//! The `HydrationStore` trait.
//!
//! Implemented by storage backends (`dailyme-store-sqlite`, and
//! [`MemoryStore`](crate::memory::MemoryStore) for tests). The state
//! containers depend on this abstraction only.

use std::future::Future;

use chrono::NaiveDate;
use serde_json::Value;

use crate::{
  entry::{EntryId, LogEntry},
  settings::SettingKey,
  summary::DailySummary,
};

/// Durable keyed storage with three collections: entries (indexed by logical
/// date), summaries (keyed by date) and settings (keyed by name).
///
/// Every operation may fail; callers treat failure as non-fatal. All methods
/// return `Send` futures so stores can be shared across tokio tasks.
pub trait HydrationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Entries ───────────────────────────────────────────────────────────

  /// Insert or replace an entry by id.
  fn put_entry(
    &self,
    entry: LogEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete an entry and return it, or `None` when no entry has that id.
  fn delete_entry(
    &self,
    id: EntryId,
  ) -> impl Future<Output = Result<Option<LogEntry>, Self::Error>> + Send + '_;

  /// All entries for a logical date, ordered by timestamp. Entries with
  /// equal timestamps keep insertion order.
  fn entries_for_date(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<LogEntry>, Self::Error>> + Send + '_;

  /// Every stored entry, ordered by timestamp.
  fn all_entries(&self) -> impl Future<Output = Result<Vec<LogEntry>, Self::Error>> + Send + '_;

  /// Remove every entry for `date` in one transaction: either all go or
  /// none do. Returns the number removed.
  fn delete_all_for_date(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Summaries ─────────────────────────────────────────────────────────

  fn upsert_summary(
    &self,
    summary: DailySummary,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_summary(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<DailySummary>, Self::Error>> + Send + '_;

  /// Summaries for `dates`, aligned with the input; `None` where absent.
  fn get_summaries<'a>(
    &'a self,
    dates: &'a [NaiveDate],
  ) -> impl Future<Output = Result<Vec<Option<DailySummary>>, Self::Error>> + Send + 'a;

  // ── Settings ──────────────────────────────────────────────────────────

  fn get_setting(
    &self,
    key: SettingKey,
  ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send + '_;

  fn set_setting(
    &self,
    key: SettingKey,
    value: Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Write the default settings unless [`SettingKey::SENTINEL`] is already
  /// present. Idempotent. Returns whether anything was written.
  fn init_defaults(&self) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
