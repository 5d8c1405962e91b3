//! Command dispatch over the log and settings state containers.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result, bail};
use chrono::{Local, NaiveDate};
use dailyme_core::{
  date::{SystemClock, format_date, format_day_label, format_display_date},
  entry::LogEntry,
  export::{export_entries, export_file_name},
  progress::Progress,
  settings::SettingKey,
  state::{LogSnapshot, LogState, SettingsState},
  summary::DailySummary,
};
use dailyme_store_sqlite::SqliteStore;
use serde_json::json;

use crate::{Command, SettingsCommand};

// ─── App ──────────────────────────────────────────────────────────────────────

/// Loaded state for one invocation of the binary.
pub struct App {
  store:    Arc<SqliteStore>,
  settings: Arc<SettingsState<SqliteStore>>,
  log:      LogState<SqliteStore>,
}

impl App {
  /// Load settings, select `date` (or today) and its week.
  pub async fn start(store: SqliteStore, date: Option<NaiveDate>) -> Result<Self> {
    let store = Arc::new(store);
    let settings = Arc::new(SettingsState::new(store.clone()));
    settings.load().await.context("failed to load settings")?;

    let log = LogState::new(store.clone(), settings.clone(), Arc::new(SystemClock));
    let date = date.unwrap_or_else(|| log.today());
    log.select_date(date).await.with_context(|| format!("failed to load {date}"))?;
    log.load_week_history().await.context("failed to load week history")?;

    Ok(Self { store, settings, log })
  }

  pub async fn run(self, command: Command) -> Result<()> {
    match command {
      Command::Status { json } => self.print_status(json),
      Command::Add { ml, kind } => {
        let entry = self.log.add_entry(ml, kind).await?;
        self.print_added(&entry);
      }
      Command::Cup { kind } => {
        let entry = self.log.add_cup(kind).await?;
        self.print_added(&entry);
      }
      Command::Glass { kind } => {
        let entry = self.log.add_glass(kind).await?;
        self.print_added(&entry);
      }
      Command::Undo => match self.log.undo_last().await? {
        Some(entry) => {
          println!("Removed {} ml of {}.", entry.amount_ml, entry.kind.label());
          self.print_status(false);
        }
        None => println!("Nothing to undo."),
      },
      Command::Remove { id } => {
        self.log.remove_entry(id).await?;
        println!("Removed {id}.");
        self.print_status(false);
      }
      Command::Reset { yes } => {
        if !yes {
          bail!("refusing to reset without --yes");
        }
        let date = self.log.selected_date();
        let removed = self.log.reset_day(date).await?;
        println!("Removed {removed} entries from {}.", format_date(date));
        self.print_status(false);
      }
      Command::Week => self.print_week(),
      Command::Log => self.print_log(),
      Command::Settings(cmd) => self.run_settings(cmd).await?,
      Command::Export { out } => self.export(out).await?,
    }
    Ok(())
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  async fn run_settings(&self, cmd: SettingsCommand) -> Result<()> {
    match cmd {
      SettingsCommand::Show => {}
      SettingsCommand::Goal { ml } => self.settings.set_daily_goal(ml).await?,
      SettingsCommand::Cup { ml } => self.settings.set_cup_size(ml).await?,
      SettingsCommand::Theme { theme } => self.settings.set_theme(theme).await?,
      SettingsCommand::DayStart { hour } => self.settings.set_day_start_hour(hour).await?,
    }

    let current = self.settings.current();
    for (key, value) in current.to_values() {
      let unit = match key {
        SettingKey::DailyGoal | SettingKey::CupSize => " ml",
        SettingKey::DayStartHour => ":00",
        SettingKey::Theme => "",
      };
      let value = value.as_str().map_or_else(|| value.to_string(), str::to_owned);
      println!("{:<16}{value}{unit}", key.as_str());
    }
    Ok(())
  }

  // ── Export ────────────────────────────────────────────────────────────────

  async fn export(&self, out: Option<PathBuf>) -> Result<()> {
    let json = export_entries(&*self.store).await.context("failed to export entries")?;
    let path = out.unwrap_or_else(|| PathBuf::from(export_file_name(self.log.today())));

    if path.as_os_str() == "-" {
      println!("{json}");
      return Ok(());
    }
    tokio::fs::write(&path, json)
      .await
      .with_context(|| format!("failed to write {path:?}"))?;
    println!("Exported to {}.", path.display());
    Ok(())
  }

  // ── Output ────────────────────────────────────────────────────────────────

  fn progress(&self, snap: &LogSnapshot) -> Progress {
    let is_today = snap.selected_date == self.log.today();
    Progress::for_summary(snap.summary.as_ref(), &self.settings.current(), is_today)
  }

  fn print_added(&self, entry: &LogEntry) {
    println!("Logged {} ml of {}.", entry.amount_ml, entry.kind.label());
    let snap = self.log.snapshot();
    if snap.goal_just_reached {
      println!("Daily goal reached!");
      self.log.clear_goal_reached();
    }
    self.print_status(false);
  }

  fn print_status(&self, as_json: bool) {
    let snap = self.log.snapshot();
    let progress = self.progress(&snap);

    if as_json {
      let remaining = snap.summary.as_ref().map_or(0, DailySummary::remaining_ml);
      let out = json!({
        "date": format_date(snap.selected_date),
        "progress": progress,
        "remaining_ml": remaining,
        "entries_count": snap.entries.len(),
      });
      println!("{out}");
      return;
    }

    let today = self.log.today();
    println!("{}", format_display_date(snap.selected_date, today));
    println!(
      "{} / {} ml  ({}%)  {}",
      progress.total_ml,
      progress.goal_ml,
      progress.percentage,
      cup_bar(&progress)
    );
  }

  fn print_log(&self) {
    let snap = self.log.snapshot();
    let today = self.log.today();
    println!("{}", format_display_date(snap.selected_date, today));
    if snap.entries.is_empty() {
      println!("  no entries");
      return;
    }
    for entry in &snap.entries {
      println!(
        "  {}  {:>5} ml  {:<7} {}",
        entry.timestamp.with_timezone(&Local).format("%H:%M"),
        entry.amount_ml,
        entry.kind.label(),
        entry.id,
      );
    }
  }

  fn print_week(&self) {
    let snap = self.log.snapshot();
    let today = self.log.today();
    for day in &snap.week_history {
      let mark = if day.goal_reached { "✓" } else { " " };
      let pct = percent_of(day.total_ml, day.goal_ml);
      println!(
        "{:<6}{mark} {:>6} ml  {}",
        format_day_label(day.date, today),
        day.total_ml,
        bar(pct, 20)
      );
    }
  }
}

/// One glyph per cup of the goal: filled for cups drunk.
fn cup_bar(p: &Progress) -> String {
  let filled = p.cups_consumed as usize;
  let empty = (p.total_cups as usize).saturating_sub(filled);
  format!("{}{}", "●".repeat(filled), "○".repeat(empty))
}

fn percent_of(total_ml: u64, goal_ml: u32) -> u8 {
  let goal = u64::from(goal_ml.max(1));
  ((total_ml * 100) / goal).min(100) as u8
}

fn bar(pct: u8, width: usize) -> String {
  let filled = usize::from(pct) * width / 100;
  format!("{}{}", "█".repeat(filled), "·".repeat(width - filled))
}

#[cfg(test)]
mod tests {
  use dailyme_core::settings::Settings;

  use super::*;

  #[test]
  fn bars_fill_proportionally() {
    assert_eq!(bar(0, 4), "····");
    assert_eq!(bar(50, 4), "██··");
    assert_eq!(bar(100, 4), "████");
    assert_eq!(percent_of(5000, 2500), 100);
  }

  #[test]
  fn cup_bar_counts_whole_cups() {
    let p = Progress::new(600, &Settings { daily_goal_ml: 1000, ..Settings::default() }, true);
    assert_eq!(cup_bar(&p), "●●○○");
  }

  #[tokio::test]
  async fn reset_requires_confirmation() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = App::start(store, None).await.unwrap();
    app.log.add_entry(250, Default::default()).await.unwrap();

    let err = app.run(Command::Reset { yes: false }).await.unwrap_err();
    assert!(err.to_string().contains("--yes"));
  }

  #[tokio::test]
  async fn confirmed_reset_clears_the_day() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = App::start(store.clone(), None).await.unwrap();
    let today = app.log.today();
    app.log.add_entry(250, Default::default()).await.unwrap();
    app.run(Command::Reset { yes: true }).await.unwrap();

    let app = App::start(store, Some(today)).await.unwrap();
    let snap = app.log.snapshot();
    assert!(snap.entries.is_empty());
    assert_eq!(snap.summary.map(|s| s.total_ml), Some(0));
  }

  #[tokio::test]
  async fn commands_update_the_store() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = App::start(store.clone(), None).await.unwrap();
    let today = app.log.today();
    app.run(Command::Glass { kind: Default::default() }).await.unwrap();

    let app = App::start(store.clone(), Some(today)).await.unwrap();
    assert_eq!(app.log.snapshot().entries.len(), 1);
    app.run(Command::Undo).await.unwrap();

    let app = App::start(store, Some(today)).await.unwrap();
    assert!(app.log.snapshot().entries.is_empty());
  }
}
