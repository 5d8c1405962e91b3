//! Display values derived from a day's total and the current settings.

use serde::Serialize;

use crate::{settings::Settings, summary::DailySummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
  pub total_ml:      u64,
  pub goal_ml:       u32,
  pub cup_size_ml:   u32,
  /// `0..=100`, rounded to the nearest percent.
  pub percentage:    u8,
  /// Cups of the configured size needed to reach the goal.
  pub total_cups:    u32,
  /// Whole cups drunk so far, capped at `total_cups`.
  pub cups_consumed: u32,
  pub is_today:      bool,
}

impl Progress {
  pub fn new(total_ml: u64, settings: &Settings, is_today: bool) -> Self {
    let goal = u64::from(settings.daily_goal_ml.max(1));
    let cup = u64::from(settings.cup_size_ml.max(1));

    let percentage = ((total_ml * 100 + goal / 2) / goal).min(100) as u8;
    let total_cups = goal.div_ceil(cup);
    let cups_consumed = (total_ml / cup).min(total_cups);

    Self {
      total_ml,
      goal_ml: settings.daily_goal_ml,
      cup_size_ml: settings.cup_size_ml,
      percentage,
      total_cups: u32::try_from(total_cups).unwrap_or(u32::MAX),
      cups_consumed: u32::try_from(cups_consumed).unwrap_or(u32::MAX),
      is_today,
    }
  }

  /// Progress for a summary, or for an empty day when none is loaded yet.
  pub fn for_summary(summary: Option<&DailySummary>, settings: &Settings, is_today: bool) -> Self {
    Self::new(summary.map_or(0, |s| s.total_ml), settings, is_today)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn settings(goal: u32, cup: u32) -> Settings {
    Settings { daily_goal_ml: goal, cup_size_ml: cup, ..Settings::default() }
  }

  #[test]
  fn halfway_with_default_settings() {
    let p = Progress::new(1250, &Settings::default(), true);
    assert_eq!(p.percentage, 50);
    assert_eq!(p.total_cups, 10);
    assert_eq!(p.cups_consumed, 5);
  }

  #[test]
  fn percentage_rounds_and_caps() {
    assert_eq!(Progress::new(800, &settings(2500, 250), true).percentage, 32);
    assert_eq!(Progress::new(2512, &settings(2500, 250), true).percentage, 100);
    assert_eq!(Progress::new(9000, &settings(2500, 250), true).percentage, 100);
    // 1/3 of the goal rounds down, 2/3 rounds up.
    assert_eq!(Progress::new(1000, &settings(3000, 250), true).percentage, 33);
    assert_eq!(Progress::new(2000, &settings(3000, 250), true).percentage, 67);
  }

  #[test]
  fn cups_use_ceiling_and_cap() {
    let p = Progress::new(5000, &settings(2500, 330), false);
    assert_eq!(p.total_cups, 8);
    assert_eq!(p.cups_consumed, 8);
    assert!(!p.is_today);

    let partial = Progress::new(320, &settings(2500, 330), true);
    assert_eq!(partial.cups_consumed, 0);
  }

  #[test]
  fn missing_summary_counts_as_empty() {
    let p = Progress::for_summary(None, &Settings::default(), true);
    assert_eq!((p.total_ml, p.percentage, p.cups_consumed), (0, 0, 0));
  }
}
