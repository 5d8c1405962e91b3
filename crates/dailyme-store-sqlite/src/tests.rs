//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, TimeZone, Utc};
use dailyme_core::{
  date::ManualClock,
  entry::{DrinkType, EntryId, LogEntry},
  export::export_entries,
  settings::{SettingKey, Settings},
  state::{LogState, SettingsState, WEEK_LENGTH},
  store::HydrationStore,
  summary::DailySummary,
};
use serde_json::Value;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2026, 3, d).unwrap() }

fn entry(date: NaiveDate, minute: u32, ml: u32) -> LogEntry {
  let ts = Utc.with_ymd_and_hms(2026, 3, 5, 8, minute, 0).unwrap();
  LogEntry::new(date, ts, ml, DrinkType::Water).unwrap()
}

// ─── Entries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn entries_round_trip_with_every_field() {
  let s = store().await;
  let mut e = entry(day(5), 0, 330);
  e.kind = DrinkType::Coffee;
  s.put_entry(e.clone()).await.unwrap();

  assert_eq!(s.entries_for_date(day(5)).await.unwrap(), vec![e]);
  assert!(s.entries_for_date(day(4)).await.unwrap().is_empty());
}

#[tokio::test]
async fn entries_are_ordered_by_timestamp_then_insertion() {
  let s = store().await;
  let late = entry(day(5), 30, 250);
  let tie_a = entry(day(5), 10, 100);
  let tie_b = entry(day(5), 10, 200);
  for e in [&late, &tie_a, &tie_b] {
    s.put_entry(e.clone()).await.unwrap();
  }

  let ids: Vec<EntryId> = s.entries_for_date(day(5)).await.unwrap().iter().map(|e| e.id).collect();
  assert_eq!(ids, [tie_a.id, tie_b.id, late.id]);
}

#[tokio::test]
async fn put_with_existing_id_replaces_in_place() {
  let s = store().await;
  let first = entry(day(5), 10, 100);
  let second = entry(day(5), 10, 200);
  s.put_entry(first.clone()).await.unwrap();
  s.put_entry(second.clone()).await.unwrap();

  let replaced = LogEntry { amount_ml: 150, ..first.clone() };
  s.put_entry(replaced.clone()).await.unwrap();

  let stored = s.entries_for_date(day(5)).await.unwrap();
  assert_eq!(stored, vec![replaced, second]);
}

#[tokio::test]
async fn delete_entry_returns_the_removed_row() {
  let s = store().await;
  let e = entry(day(5), 0, 250);
  s.put_entry(e.clone()).await.unwrap();

  assert_eq!(s.delete_entry(e.id).await.unwrap(), Some(e.clone()));
  assert_eq!(s.delete_entry(e.id).await.unwrap(), None);
  assert!(s.entries_for_date(day(5)).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_all_for_date_leaves_other_days_alone() {
  let s = store().await;
  for minute in 0..3 {
    s.put_entry(entry(day(5), minute, 250)).await.unwrap();
  }
  let keep = entry(day(4), 0, 500);
  s.put_entry(keep.clone()).await.unwrap();

  assert_eq!(s.delete_all_for_date(day(5)).await.unwrap(), 3);
  assert_eq!(s.delete_all_for_date(day(5)).await.unwrap(), 0);
  assert_eq!(s.all_entries().await.unwrap(), vec![keep]);
}

#[tokio::test]
async fn all_entries_spans_dates_in_timestamp_order() {
  let s = store().await;
  let later = entry(day(5), 20, 250);
  let earlier = entry(day(4), 5, 250);
  s.put_entry(later.clone()).await.unwrap();
  s.put_entry(earlier.clone()).await.unwrap();

  assert_eq!(s.all_entries().await.unwrap(), vec![earlier, later]);
}

// ─── Summaries ───────────────────────────────────────────────────────────────

fn summary(date: NaiveDate, total: u64) -> DailySummary {
  DailySummary {
    date,
    total_ml: total,
    goal_ml: 2500,
    entries_count: 2,
    goal_reached: total >= 2500,
    last_updated: Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap(),
  }
}

#[tokio::test]
async fn upsert_summary_overwrites_the_day() {
  let s = store().await;
  assert!(s.get_summary(day(5)).await.unwrap().is_none());

  s.upsert_summary(summary(day(5), 1000)).await.unwrap();
  s.upsert_summary(summary(day(5), 2600)).await.unwrap();

  let stored = s.get_summary(day(5)).await.unwrap().unwrap();
  assert_eq!(stored, summary(day(5), 2600));
  assert!(stored.goal_reached);
}

#[tokio::test]
async fn get_summaries_is_aligned_with_the_requested_dates() {
  let s = store().await;
  s.upsert_summary(summary(day(2), 500)).await.unwrap();
  s.upsert_summary(summary(day(4), 900)).await.unwrap();

  let dates = [day(1), day(2), day(3), day(4)];
  let got = s.get_summaries(&dates).await.unwrap();
  assert_eq!(got, vec![None, Some(summary(day(2), 500)), None, Some(summary(day(4), 900))]);
  assert!(s.get_summaries(&[]).await.unwrap().is_empty());
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn init_defaults_writes_every_key_once() {
  let s = store().await;
  assert!(s.init_defaults().await.unwrap());

  for (key, value) in Settings::default().to_values() {
    assert_eq!(s.get_setting(key).await.unwrap(), Some(value), "{key}");
  }

  s.set_setting(SettingKey::CupSize, Value::from(330)).await.unwrap();
  assert!(!s.init_defaults().await.unwrap());
  assert_eq!(s.get_setting(SettingKey::CupSize).await.unwrap(), Some(Value::from(330)));
}

#[tokio::test]
async fn missing_setting_is_none() {
  let s = store().await;
  assert!(s.get_setting(SettingKey::Theme).await.unwrap().is_none());

  s.set_setting(SettingKey::Theme, Value::from("dark")).await.unwrap();
  assert_eq!(s.get_setting(SettingKey::Theme).await.unwrap(), Some(Value::from("dark")));
}

// ─── File-backed ─────────────────────────────────────────────────────────────

fn scratch_path() -> std::path::PathBuf {
  std::env::temp_dir().join(format!("dailyme-test-{}.db", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn data_survives_reopening_the_file() {
  let path = scratch_path();
  let e = entry(day(5), 0, 250);
  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.init_defaults().await.unwrap();
    s.put_entry(e.clone()).await.unwrap();
    s.upsert_summary(summary(day(5), 250)).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert!(!s.init_defaults().await.unwrap());
  assert_eq!(s.entries_for_date(day(5)).await.unwrap(), vec![e]);
  assert_eq!(s.get_summary(day(5)).await.unwrap(), Some(summary(day(5), 250)));

  drop(s);
  let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn newer_schema_version_is_refused() {
  let path = scratch_path();
  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 99;").unwrap();
  }

  let result = SqliteStore::open(&path).await;
  assert!(matches!(result, Err(Error::SchemaVersion { found: 99, supported: 1 })));

  let _ = std::fs::remove_file(&path);
}

// ─── State containers over SQLite ────────────────────────────────────────────

struct App {
  store:    Arc<SqliteStore>,
  clock:    Arc<ManualClock>,
  settings: Arc<SettingsState<SqliteStore>>,
  log:      LogState<SqliteStore>,
}

async fn app() -> App {
  let store = Arc::new(store().await);
  let clock = Arc::new(ManualClock::new(Local.with_ymd_and_hms(2026, 3, 5, 9, 0, 0).unwrap()));
  let settings = Arc::new(SettingsState::new(store.clone()));
  settings.load().await.unwrap();
  let log = LogState::new(store.clone(), settings.clone(), clock.clone());
  log.select_today().await.unwrap();
  App { store, clock, settings, log }
}

impl App {
  async fn add(&self, ml: u32) -> LogEntry {
    self.clock.advance(Duration::minutes(1));
    self.log.add_entry(ml, DrinkType::Water).await.unwrap()
  }
}

#[tokio::test]
async fn adding_entries_keeps_the_stored_summary_in_step() {
  let app = app().await;
  app.add(250).await;
  app.add(500).await;

  let snap = app.log.snapshot();
  let summary = snap.summary.unwrap();
  assert_eq!((summary.total_ml, summary.entries_count), (750, 2));
  assert_eq!(app.store.get_summary(day(5)).await.unwrap(), Some(summary));
  assert_eq!(snap.entries, app.store.entries_for_date(day(5)).await.unwrap());
  assert_eq!(snap.week_history.len(), WEEK_LENGTH);
  assert_eq!(snap.week_history.last().map(|s| s.total_ml), Some(750));
}

#[tokio::test]
async fn goal_signal_fires_once_when_crossing() {
  let app = app().await;
  app.settings.set_daily_goal(1000).await.unwrap();

  app.add(600).await;
  assert!(!app.log.snapshot().goal_just_reached);
  app.add(500).await;
  assert!(app.log.snapshot().goal_just_reached);
  app.add(250).await;
  assert!(!app.log.snapshot().goal_just_reached);
}

#[tokio::test]
async fn undo_then_reset_empty_the_day() {
  let app = app().await;
  app.add(250).await;
  let last = app.add(330).await;

  assert_eq!(app.log.undo_last().await.unwrap(), Some(last));
  assert_eq!(app.store.get_summary(day(5)).await.unwrap().unwrap().total_ml, 250);

  assert_eq!(app.log.reset_day(day(5)).await.unwrap(), 1);
  let stored = app.store.get_summary(day(5)).await.unwrap().unwrap();
  assert_eq!((stored.total_ml, stored.entries_count, stored.goal_reached), (0, 0, false));
  assert!(app.log.snapshot().entries.is_empty());
  assert_eq!(app.log.undo_last().await.unwrap(), None);
}

#[tokio::test]
async fn cup_uses_the_persisted_cup_size() {
  let app = app().await;
  app.settings.set_cup_size(330).await.unwrap();

  let reloaded = SettingsState::new(app.store.clone());
  assert_eq!(reloaded.load().await.unwrap().cup_size_ml, 330);

  let cup = app.log.add_cup(DrinkType::Tea).await.unwrap();
  assert_eq!(cup.amount_ml, 330);
  assert_eq!(app.log.add_glass(DrinkType::Water).await.unwrap().amount_ml, 500);
}

#[tokio::test]
async fn export_lists_everything_stored() {
  let app = app().await;
  app.add(250).await;
  app.log.select_date(day(4)).await.unwrap();
  app.add(500).await;

  let json: Value = serde_json::from_str(&export_entries(&*app.store).await.unwrap()).unwrap();
  let dates: Vec<&str> = json
    .as_array()
    .unwrap()
    .iter()
    .map(|row| row["date"].as_str().unwrap())
    .collect();
  assert_eq!(dates, ["2026-03-05", "2026-03-04"]);
}

#[tokio::test]
async fn removing_an_entry_of_another_day_updates_that_day() {
  let app = app().await;
  app.log.select_date(day(4)).await.unwrap();
  let earlier = app.add(700).await;
  app.log.select_date(day(5)).await.unwrap();

  app.log.remove_entry(earlier.id).await.unwrap();

  assert!(app.store.entries_for_date(day(4)).await.unwrap().is_empty());
  let stored = app.store.get_summary(day(4)).await.unwrap().unwrap();
  assert_eq!((stored.total_ml, stored.entries_count), (0, 0));
  assert_eq!(app.log.snapshot().selected_date, day(5));
}
