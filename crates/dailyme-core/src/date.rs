//! Logical-day arithmetic.
//!
//! A logical day starts `day_start_hour` hours after midnight. Every
//! date-keyed operation (entry storage, summaries, week history) uses the
//! logical date of an instant, never its raw calendar date, so a drink logged
//! at 02:00 with a 06:00 day start counts against the previous day.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};

use crate::{Error, Result};

/// Storage format of a logical day.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Source of "now" for the state containers.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Local>;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Local> { Local::now() }
}

/// A clock that only moves when told to. Used by tests and replays.
#[derive(Debug)]
pub struct ManualClock {
  now: Mutex<DateTime<Local>>,
}

impl ManualClock {
  pub fn new(now: DateTime<Local>) -> Self { Self { now: Mutex::new(now) } }

  pub fn set(&self, now: DateTime<Local>) {
    *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
  }

  pub fn advance(&self, by: Duration) {
    let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
    *now += by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Local> {
    *self.now.lock().unwrap_or_else(|e| e.into_inner())
  }
}

// ─── Logical days ────────────────────────────────────────────────────────────

/// The logical date of `instant`, evaluated in the instant's own timezone.
pub fn logical_date<Tz: TimeZone>(instant: &DateTime<Tz>, day_start_hour: u8) -> NaiveDate {
  let shifted = instant.clone() - Duration::hours(i64::from(day_start_hour));
  shifted.date_naive()
}

/// The logical date of the local wall clock.
pub fn logical_today(day_start_hour: u8) -> NaiveDate {
  logical_date(&Local::now(), day_start_hour)
}

/// The `n` most recent logical days ending at today, oldest first.
pub fn last_n_days(n: usize, day_start_hour: u8) -> Vec<NaiveDate> {
  last_n_days_from(logical_today(day_start_hour), n)
}

/// The `n` days ending at `today`, oldest first.
pub fn last_n_days_from(today: NaiveDate, n: usize) -> Vec<NaiveDate> {
  (0..n)
    .rev()
    .map(|offset| today - Duration::days(offset as i64))
    .collect()
}

/// The calendar date `days` away from `date`. Independent of the day start
/// hour.
pub fn shift_date(date: NaiveDate, days: i64) -> NaiveDate { date + Duration::days(days) }

pub fn parse_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(s.to_owned()))
}

pub fn format_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

// ─── Labels ──────────────────────────────────────────────────────────────────

/// Short label for a history bar: `Today` or the weekday abbreviation.
pub fn format_day_label(date: NaiveDate, today: NaiveDate) -> String {
  if date == today {
    "Today".to_owned()
  } else {
    date.format("%a").to_string()
  }
}

/// Heading for a day view, e.g. `Today, Mar 5`, `Yesterday, Mar 4` or
/// `Tue, Mar 3`.
pub fn format_display_date(date: NaiveDate, today: NaiveDate) -> String {
  let short = date.format("%b %-d");
  if date == today {
    format!("Today, {short}")
  } else if date == shift_date(today, -1) {
    format!("Yesterday, {short}")
  } else {
    date.format("%a, %b %-d").to_string()
  }
}
