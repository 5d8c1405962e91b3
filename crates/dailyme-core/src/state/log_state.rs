//! [`LogState`] — orchestrates entry mutations and keeps the selected day's
//! summary and the week history in step with them.
//!
//! Every mutation runs mutation → recalculation → entry refresh → week
//! history, then publishes one snapshot. Mutations are serialized by an
//! async mutex. Date loads are not; overlapping loads are tagged with a
//! generation number and only the newest one may publish.

use std::sync::{
  Arc,
  atomic::{AtomicU64, Ordering},
};

use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

use crate::{
  Error, Result,
  aggregate::recalculate_summary,
  date::{Clock, last_n_days_from, logical_date},
  entry::{DrinkType, EntryId, LogEntry},
  settings::GLASS_ML,
  state::SettingsState,
  store::HydrationStore,
  summary::DailySummary,
};

/// Number of days in the history strip.
pub const WEEK_LENGTH: usize = 7;

/// Everything a front end needs to render the log view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSnapshot {
  pub selected_date:     NaiveDate,
  /// Entries of `selected_date`, ordered by timestamp.
  pub entries:           Vec<LogEntry>,
  /// Summary of `selected_date`; `None` until the first load completes.
  pub summary:           Option<DailySummary>,
  /// Last [`WEEK_LENGTH`] logical days, oldest first. Empty until loaded.
  pub week_history:      Vec<DailySummary>,
  pub loading:           bool,
  /// One-shot signal: the last add moved the day from below to at/above its
  /// goal. Cleared by the next add, a reset or [`LogState::clear_goal_reached`].
  pub goal_just_reached: bool,
}

impl LogSnapshot {
  fn empty(date: NaiveDate) -> Self {
    Self {
      selected_date:     date,
      entries:           Vec::new(),
      summary:           None,
      week_history:      Vec::new(),
      loading:           false,
      goal_just_reached: false,
    }
  }
}

pub struct LogState<S> {
  store:      Arc<S>,
  settings:   Arc<SettingsState<S>>,
  clock:      Arc<dyn Clock>,
  tx:         watch::Sender<LogSnapshot>,
  /// Bumped by every date load and by every commit to the selected date.
  generation: AtomicU64,
  mutation:   Mutex<()>,
}

impl<S: HydrationStore> LogState<S> {
  /// A container positioned on the current logical day. Nothing is loaded
  /// until [`select_date`](Self::select_date) is called.
  pub fn new(store: Arc<S>, settings: Arc<SettingsState<S>>, clock: Arc<dyn Clock>) -> Self {
    let today = logical_date(&clock.now(), settings.current().day_start_hour);
    let (tx, _rx) = watch::channel(LogSnapshot::empty(today));
    Self {
      store,
      settings,
      clock,
      tx,
      generation: AtomicU64::new(0),
      mutation: Mutex::new(()),
    }
  }

  pub fn subscribe(&self) -> watch::Receiver<LogSnapshot> { self.tx.subscribe() }

  pub fn snapshot(&self) -> LogSnapshot { self.tx.borrow().clone() }

  pub fn selected_date(&self) -> NaiveDate { self.tx.borrow().selected_date }

  /// The logical day the wall clock is in, under the current day start hour.
  pub fn today(&self) -> NaiveDate {
    logical_date(&self.clock.now(), self.settings.current().day_start_hour)
  }

  // ── Loading ───────────────────────────────────────────────────────────

  /// Select `date` and load its entries and summary.
  ///
  /// When called again before an earlier load finishes, only the most
  /// recent call publishes its result.
  pub async fn select_date(&self, date: NaiveDate) -> Result<()> {
    let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
    let mut previous = date;
    self.tx.send_modify(|s| {
      previous = std::mem::replace(&mut s.selected_date, date);
      s.loading = true;
    });

    let loaded = self.load_day(date).await;

    let mut outcome = Ok(());
    self.tx.send_if_modified(|s| {
      if self.generation.load(Ordering::SeqCst) != generation {
        debug!(%date, "discarding stale day load");
        return false;
      }
      s.loading = false;
      match loaded {
        Ok((entries, summary)) => {
          s.entries = entries;
          s.summary = Some(summary);
        }
        Err(e) => {
          warn!(%date, error = %e, "failed to load day");
          // `previous` may itself be a superseded load; go back to the day
          // the published entries and summary belong to.
          s.selected_date = s.summary.as_ref().map_or(previous, |summary| summary.date);
          outcome = Err(e);
        }
      }
      true
    });
    outcome
  }

  pub async fn select_today(&self) -> Result<()> { self.select_date(self.today()).await }

  /// Entries for `date` and a summary computed from them under the current
  /// goal. Nothing is written.
  async fn load_day(&self, date: NaiveDate) -> Result<(Vec<LogEntry>, DailySummary)> {
    let entries = self.store.entries_for_date(date).await.map_err(Error::read)?;
    let goal = self.settings.current().daily_goal_ml;
    let now = self.clock.now().with_timezone(&Utc);
    let summary = DailySummary::from_entries(date, &entries, goal, now);
    debug!(%date, entries = entries.len(), "loaded day");
    Ok((entries, summary))
  }

  /// Load the last [`WEEK_LENGTH`] logical days' summaries and publish them.
  pub async fn load_week_history(&self) -> Result<Vec<DailySummary>> {
    let history = self.fetch_week_history().await.inspect_err(|e| {
      warn!(error = %e, "failed to load week history");
    })?;
    self.tx.send_modify(|s| s.week_history = history.clone());
    Ok(history)
  }

  /// Always exactly [`WEEK_LENGTH`] items; days without a stored summary get
  /// an unpersisted zero placeholder.
  async fn fetch_week_history(&self) -> Result<Vec<DailySummary>> {
    let dates = last_n_days_from(self.today(), WEEK_LENGTH);
    let stored = self.store.get_summaries(&dates).await.map_err(Error::read)?;
    let goal = self.settings.current().daily_goal_ml;
    Ok(
      dates
        .iter()
        .zip(stored)
        .map(|(&date, summary)| summary.unwrap_or_else(|| DailySummary::placeholder(date, goal)))
        .collect(),
    )
  }

  /// Entries of `date` after a committed mutation. When the read fails the
  /// loaded list is patched instead, since storage already holds the change.
  async fn refreshed_entries(
    &self,
    date: NaiveDate,
    patch: impl FnOnce(&mut Vec<LogEntry>),
  ) -> Vec<LogEntry> {
    match self.store.entries_for_date(date).await {
      Ok(entries) => entries,
      Err(e) => {
        warn!(%date, error = %e, "failed to refresh entries; patching loaded list");
        let mut entries = self.tx.borrow().entries.clone();
        patch(&mut entries);
        entries
      }
    }
  }

  /// Week history for a commit; on failure the previous history is kept.
  async fn refreshed_week_history(&self) -> Option<Vec<DailySummary>> {
    match self.fetch_week_history().await {
      Ok(history) => Some(history),
      Err(e) => {
        warn!(error = %e, "failed to refresh week history; keeping previous");
        None
      }
    }
  }

  // ── Mutations ─────────────────────────────────────────────────────────

  /// Log a drink against the selected date.
  pub async fn add_entry(&self, amount_ml: u32, kind: DrinkType) -> Result<LogEntry> {
    let _guard = self.mutation.lock().await;
    self.add_locked(amount_ml, kind).await.inspect_err(|e| {
      error!(amount_ml, %kind, error = %e, "failed to add entry");
    })
  }

  /// Log one cup of the configured size.
  pub async fn add_cup(&self, kind: DrinkType) -> Result<LogEntry> {
    self.add_entry(self.settings.current().cup_size_ml, kind).await
  }

  /// Log one glass.
  pub async fn add_glass(&self, kind: DrinkType) -> Result<LogEntry> {
    self.add_entry(GLASS_ML, kind).await
  }

  async fn add_locked(&self, amount_ml: u32, kind: DrinkType) -> Result<LogEntry> {
    let (date, loaded_summary) = {
      let s = self.tx.borrow();
      (s.selected_date, s.summary.clone())
    };
    let was_reached = match loaded_summary {
      Some(summary) if summary.date == date => summary.goal_reached,
      _ => self
        .store
        .get_summary(date)
        .await
        .map_err(Error::read)?
        .is_some_and(|s| s.goal_reached),
    };

    let goal = self.settings.current().daily_goal_ml;
    let now = self.clock.now().with_timezone(&Utc);
    let entry = LogEntry::new(date, now, amount_ml, kind)?;

    self.store.put_entry(entry.clone()).await.map_err(Error::write)?;

    let summary = match recalculate_summary(&*self.store, date, goal, now).await {
      Ok(summary) => summary,
      Err(e) => {
        self.undo_put(&entry).await;
        return Err(e);
      }
    };
    let entries = self
      .refreshed_entries(date, |entries| {
        entries.push(entry.clone());
        entries.sort_by_key(|e| e.timestamp);
      })
      .await;
    let week_history = self.refreshed_week_history().await;

    let goal_just_reached = !was_reached && summary.goal_reached;
    info!(%date, amount_ml, total_ml = summary.total_ml, goal_just_reached, "added entry");

    self.commit(date, entries, summary, week_history, |s| {
      s.goal_just_reached = goal_just_reached;
    });
    Ok(entry)
  }

  /// Remove an entry by id. The summary of the day it was logged on is
  /// recalculated, whichever day is selected.
  pub async fn remove_entry(&self, id: EntryId) -> Result<()> {
    let _guard = self.mutation.lock().await;
    self.remove_locked(id).await.inspect_err(|e| {
      error!(%id, error = %e, "failed to remove entry");
    })
  }

  /// Remove the most recent loaded entry. Returns `None` when there is
  /// nothing to undo.
  pub async fn undo_last(&self) -> Result<Option<LogEntry>> {
    let _guard = self.mutation.lock().await;
    let last = self
      .tx
      .borrow()
      .entries
      .iter()
      .max_by_key(|e| e.timestamp)
      .cloned();

    let Some(last) = last else {
      debug!("nothing to undo");
      return Ok(None);
    };
    self.remove_locked(last.id).await.inspect_err(|e| {
      error!(id = %last.id, error = %e, "failed to undo last entry");
    })?;
    Ok(Some(last))
  }

  async fn remove_locked(&self, id: EntryId) -> Result<()> {
    let goal = self.settings.current().daily_goal_ml;

    // The deleted row tells us its own date, which need not be the selected
    // one.
    let removed = self
      .store
      .delete_entry(id)
      .await
      .map_err(Error::write)?
      .ok_or(Error::EntryNotFound(id))?;
    let date = removed.date;

    let now = self.clock.now().with_timezone(&Utc);
    let summary = match recalculate_summary(&*self.store, date, goal, now).await {
      Ok(summary) => summary,
      Err(e) => {
        self.undo_delete(&removed).await;
        return Err(e);
      }
    };
    let entries = self.refreshed_entries(date, |entries| entries.retain(|e| e.id != id)).await;
    let week_history = self.refreshed_week_history().await;

    info!(%date, %id, total_ml = summary.total_ml, "removed entry");
    self.commit(date, entries, summary, week_history, |_| {});
    Ok(())
  }

  /// Delete every entry of `date` atomically and zero its summary. Returns
  /// the number of entries removed.
  pub async fn reset_day(&self, date: NaiveDate) -> Result<u64> {
    let _guard = self.mutation.lock().await;
    self.reset_locked(date).await.inspect_err(|e| {
      error!(%date, error = %e, "failed to reset day");
    })
  }

  async fn reset_locked(&self, date: NaiveDate) -> Result<u64> {
    let goal = self.settings.current().daily_goal_ml;
    let cleared = self.store.entries_for_date(date).await.map_err(Error::read)?;
    let removed = self.store.delete_all_for_date(date).await.map_err(Error::write)?;

    let now = self.clock.now().with_timezone(&Utc);
    let summary = match recalculate_summary(&*self.store, date, goal, now).await {
      Ok(summary) => summary,
      Err(e) => {
        for entry in &cleared {
          self.undo_delete(entry).await;
        }
        return Err(e);
      }
    };
    let week_history = self.refreshed_week_history().await;

    info!(%date, removed, "reset day");
    self.commit(date, Vec::new(), summary, week_history, |s| {
      s.goal_just_reached = false;
    });
    Ok(removed)
  }

  /// Consume the goal-reached signal.
  pub fn clear_goal_reached(&self) {
    self.tx.send_if_modified(|s| std::mem::replace(&mut s.goal_just_reached, false));
  }

  // ── Internals ─────────────────────────────────────────────────────────

  /// Publish the result of a mutation on `date` as one snapshot. The day's
  /// entries and summary are only applied while `date` is still selected;
  /// `extra` runs in the same case.
  fn commit(
    &self,
    date: NaiveDate,
    entries: Vec<LogEntry>,
    summary: DailySummary,
    week_history: Option<Vec<DailySummary>>,
    extra: impl FnOnce(&mut LogSnapshot),
  ) {
    self.tx.send_modify(|s| {
      if s.selected_date == date {
        // Supersedes any in-flight load of the same date.
        self.generation.fetch_add(1, Ordering::SeqCst);
        s.entries = entries;
        s.summary = Some(summary);
        s.loading = false;
        extra(s);
      }
      if let Some(history) = week_history {
        s.week_history = history;
      }
    });
  }

  /// Best-effort rollback of a put whose recalculation failed, so storage
  /// does not hold an entry its summary does not count.
  async fn undo_put(&self, entry: &LogEntry) {
    if let Err(e) = self.store.delete_entry(entry.id).await {
      error!(id = %entry.id, error = %e, "failed to roll back entry; summary is stale until the day is recalculated");
    }
  }

  async fn undo_delete(&self, entry: &LogEntry) {
    if let Err(e) = self.store.put_entry(entry.clone()).await {
      error!(id = %entry.id, error = %e, "failed to restore entry; summary is stale until the day is recalculated");
    }
  }
}
