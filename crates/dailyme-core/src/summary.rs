//! Daily summaries — the derived aggregate of one logical day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::LogEntry;

/// Aggregate of one logical day's entries.
///
/// Always rebuilt from the full entry set for the date; never patched in
/// place. `goal_ml` is the goal at the time of the last recalculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
  pub date:          NaiveDate,
  pub total_ml:      u64,
  pub goal_ml:       u32,
  pub entries_count: u32,
  pub goal_reached:  bool,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub last_updated:  DateTime<Utc>,
}

impl DailySummary {
  /// Aggregate `entries`, all of which are expected to belong to `date`.
  pub fn from_entries<'a, I>(date: NaiveDate, entries: I, goal_ml: u32, now: DateTime<Utc>) -> Self
  where
    I: IntoIterator<Item = &'a LogEntry>,
  {
    let (total_ml, entries_count) = entries
      .into_iter()
      .fold((0u64, 0u32), |(total, count), e| (total + u64::from(e.amount_ml), count + 1));

    Self {
      date,
      total_ml,
      goal_ml,
      entries_count,
      goal_reached: total_ml >= u64::from(goal_ml),
      last_updated: now,
    }
  }

  /// Zero-valued stand-in for a day with no stored summary. Never persisted.
  pub fn placeholder(date: NaiveDate, goal_ml: u32) -> Self {
    Self {
      date,
      total_ml: 0,
      goal_ml,
      entries_count: 0,
      goal_reached: false,
      last_updated: DateTime::<Utc>::default(),
    }
  }

  /// Millilitres still missing to reach the goal.
  pub fn remaining_ml(&self) -> u64 { u64::from(self.goal_ml).saturating_sub(self.total_ml) }
}
