//! [`MemoryStore`] — a volatile [`HydrationStore`] with failure injection.
//!
//! Used by the state-container tests and as a scratch store when no durable
//! backend is available. Every operation takes a single lock, so multi-row
//! operations are trivially atomic.

use std::{
  collections::BTreeMap,
  sync::{
    Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use crate::{
  entry::{EntryId, LogEntry},
  settings::{SettingKey, Settings},
  store::HydrationStore,
  summary::DailySummary,
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryStoreError {
  #[error("write rejected")]
  WriteRejected,

  #[error("read rejected")]
  ReadRejected,
}

#[derive(Default)]
struct Inner {
  /// Insertion order; sorted by timestamp on read.
  entries:   Vec<LogEntry>,
  summaries: BTreeMap<NaiveDate, DailySummary>,
  settings:  BTreeMap<&'static str, Value>,
}

#[derive(Default)]
pub struct MemoryStore {
  inner:           Mutex<Inner>,
  fail_reads:      AtomicBool,
  fail_summaries:  AtomicBool,
  /// Remaining reads before every read fails; `None` for unlimited.
  read_budget:     Mutex<Option<usize>>,
  /// Remaining writes before every write fails; `None` for unlimited.
  write_budget:    Mutex<Option<usize>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Make every subsequent read fail (or succeed again).
  pub fn fail_reads(&self, fail: bool) { self.fail_reads.store(fail, Ordering::SeqCst); }

  /// Allow `n` more reads, then reject every read.
  pub fn fail_reads_after(&self, n: usize) { *lock(&self.read_budget) = Some(n); }

  /// Allow `n` more writes, then reject every write.
  pub fn fail_writes_after(&self, n: usize) { *lock(&self.write_budget) = Some(n); }

  /// Reject summary upserts only; entry and setting writes go through.
  pub fn fail_summary_writes(&self, fail: bool) {
    self.fail_summaries.store(fail, Ordering::SeqCst);
  }

  /// Clear all injected failures.
  pub fn heal(&self) {
    self.fail_reads(false);
    self.fail_summary_writes(false);
    *lock(&self.read_budget) = None;
    *lock(&self.write_budget) = None;
  }

  fn lock(&self) -> MutexGuard<'_, Inner> { lock(&self.inner) }

  /// Reads yield once so concurrent callers interleave the way they would
  /// against a real backend.
  async fn check_read(&self) -> Result<(), MemoryStoreError> {
    tokio::task::yield_now().await;
    if self.fail_reads.load(Ordering::SeqCst) || !spend(&self.read_budget) {
      Err(MemoryStoreError::ReadRejected)
    } else {
      Ok(())
    }
  }

  fn check_write(&self) -> Result<(), MemoryStoreError> {
    if spend(&self.write_budget) { Ok(()) } else { Err(MemoryStoreError::WriteRejected) }
  }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> { mutex.lock().unwrap_or_else(|e| e.into_inner()) }

/// Take one unit from `budget`; `false` once it is exhausted.
fn spend(budget: &Mutex<Option<usize>>) -> bool {
  match lock(budget).as_mut() {
    None => true,
    Some(0) => false,
    Some(n) => {
      *n -= 1;
      true
    }
  }
}

fn sorted(mut entries: Vec<LogEntry>) -> Vec<LogEntry> {
  // Stable: equal timestamps keep insertion order.
  entries.sort_by_key(|e| e.timestamp);
  entries
}

impl HydrationStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn put_entry(&self, entry: LogEntry) -> Result<(), Self::Error> {
    self.check_write()?;
    let mut inner = self.lock();
    match inner.entries.iter_mut().find(|e| e.id == entry.id) {
      Some(existing) => *existing = entry,
      None => inner.entries.push(entry),
    }
    Ok(())
  }

  async fn delete_entry(&self, id: EntryId) -> Result<Option<LogEntry>, Self::Error> {
    self.check_write()?;
    let mut inner = self.lock();
    let position = inner.entries.iter().position(|e| e.id == id);
    Ok(position.map(|i| inner.entries.remove(i)))
  }

  async fn entries_for_date(&self, date: NaiveDate) -> Result<Vec<LogEntry>, Self::Error> {
    self.check_read().await?;
    let inner = self.lock();
    Ok(sorted(inner.entries.iter().filter(|e| e.date == date).cloned().collect()))
  }

  async fn all_entries(&self) -> Result<Vec<LogEntry>, Self::Error> {
    self.check_read().await?;
    Ok(sorted(self.lock().entries.clone()))
  }

  async fn delete_all_for_date(&self, date: NaiveDate) -> Result<u64, Self::Error> {
    self.check_write()?;
    let mut inner = self.lock();
    let before = inner.entries.len();
    inner.entries.retain(|e| e.date != date);
    Ok((before - inner.entries.len()) as u64)
  }

  async fn upsert_summary(&self, summary: DailySummary) -> Result<(), Self::Error> {
    if self.fail_summaries.load(Ordering::SeqCst) {
      return Err(MemoryStoreError::WriteRejected);
    }
    self.check_write()?;
    self.lock().summaries.insert(summary.date, summary);
    Ok(())
  }

  async fn get_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>, Self::Error> {
    self.check_read().await?;
    Ok(self.lock().summaries.get(&date).cloned())
  }

  async fn get_summaries<'a>(
    &'a self,
    dates: &'a [NaiveDate],
  ) -> Result<Vec<Option<DailySummary>>, Self::Error> {
    self.check_read().await?;
    let inner = self.lock();
    Ok(dates.iter().map(|d| inner.summaries.get(d).cloned()).collect())
  }

  async fn get_setting(&self, key: SettingKey) -> Result<Option<Value>, Self::Error> {
    self.check_read().await?;
    Ok(self.lock().settings.get(key.as_str()).cloned())
  }

  async fn set_setting(&self, key: SettingKey, value: Value) -> Result<(), Self::Error> {
    self.check_write()?;
    self.lock().settings.insert(key.as_str(), value);
    Ok(())
  }

  async fn init_defaults(&self) -> Result<bool, Self::Error> {
    self.check_read().await?;
    if self.lock().settings.contains_key(SettingKey::SENTINEL.as_str()) {
      return Ok(false);
    }
    self.check_write()?;
    let mut inner = self.lock();
    for (key, value) in Settings::default().to_values() {
      inner.settings.insert(key.as_str(), value);
    }
    Ok(true)
  }
}
