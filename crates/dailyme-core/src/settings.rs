//! User preferences and their persisted key names.
//!
//! Settings are stored as a key → JSON value mapping. The key strings are a
//! durable contract and must survive any schema migration.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

pub const DEFAULT_DAILY_GOAL_ML: u32 = 2500;
pub const DEFAULT_CUP_SIZE_ML: u32 = 250;
pub const DEFAULT_DAY_START_HOUR: u8 = 0;

pub const MIN_DAILY_GOAL_ML: u32 = 500;
pub const MAX_DAILY_GOAL_ML: u32 = 10_000;

pub const PRESET_GOALS_ML: [u32; 4] = [2000, 2500, 3000, 3500];
pub const PRESET_CUP_SIZES_ML: [u32; 5] = [200, 250, 300, 330, 500];

/// Volume of the "glass" quick-add.
pub const GLASS_ML: u32 = 500;

// ─── Keys ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
  DailyGoal,
  CupSize,
  Theme,
  DayStartHour,
}

impl SettingKey {
  pub const ALL: [SettingKey; 4] = [Self::DailyGoal, Self::CupSize, Self::Theme, Self::DayStartHour];

  /// The defaults are written together, so the presence of this key means
  /// they have already been initialised.
  pub const SENTINEL: SettingKey = Self::DailyGoal;

  pub fn as_str(self) -> &'static str {
    match self {
      Self::DailyGoal => "daily_goal_ml",
      Self::CupSize => "cup_size_ml",
      Self::Theme => "theme",
      Self::DayStartHour => "day_start_hour",
    }
  }
}

impl fmt::Display for SettingKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for SettingKey {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|k| k.as_str() == s)
      .ok_or_else(|| format!("unknown setting key: {s:?}"))
  }
}

// ─── Theme ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  Light,
  Dark,
  #[default]
  System,
}

impl Theme {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Light => "light",
      Self::Dark => "dark",
      Self::System => "system",
    }
  }
}

impl fmt::Display for Theme {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Theme {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "light" => Ok(Self::Light),
      "dark" => Ok(Self::Dark),
      "system" => Ok(Self::System),
      other => Err(format!("unknown theme: {other:?}")),
    }
  }
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
  pub daily_goal_ml:  u32,
  pub cup_size_ml:    u32,
  pub theme:          Theme,
  pub day_start_hour: u8,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      daily_goal_ml:  DEFAULT_DAILY_GOAL_ML,
      cup_size_ml:    DEFAULT_CUP_SIZE_ML,
      theme:          Theme::System,
      day_start_hour: DEFAULT_DAY_START_HOUR,
    }
  }
}

impl Settings {
  /// The persisted representation of every key, in [`SettingKey::ALL`] order.
  pub fn to_values(&self) -> Vec<(SettingKey, Value)> {
    vec![
      (SettingKey::DailyGoal, Value::from(self.daily_goal_ml)),
      (SettingKey::CupSize, Value::from(self.cup_size_ml)),
      (SettingKey::Theme, Value::from(self.theme.as_str())),
      (SettingKey::DayStartHour, Value::from(self.day_start_hour)),
    ]
  }

  /// Apply a stored value for `key`. Values that do not decode or do not
  /// validate leave the current value untouched and return `false`.
  pub fn apply_stored(&mut self, key: SettingKey, value: &Value) -> bool {
    match key {
      SettingKey::DailyGoal => replace_with(
        &mut self.daily_goal_ml,
        decode_u32(value).filter(|v| validate_daily_goal(*v).is_ok()),
      ),
      SettingKey::CupSize => replace_with(
        &mut self.cup_size_ml,
        decode_u32(value).filter(|v| validate_cup_size(*v).is_ok()),
      ),
      SettingKey::Theme => replace_with(
        &mut self.theme,
        value.as_str().and_then(|s| s.parse::<Theme>().ok()),
      ),
      SettingKey::DayStartHour => replace_with(
        &mut self.day_start_hour,
        decode_u32(value)
          .and_then(|v| u8::try_from(v).ok())
          .filter(|v| validate_day_start_hour(*v).is_ok()),
      ),
    }
  }
}

fn replace_with<T>(slot: &mut T, value: Option<T>) -> bool {
  match value {
    Some(v) => {
      *slot = v;
      true
    }
    None => false,
  }
}

fn decode_u32(value: &Value) -> Option<u32> {
  value
    .as_u64()
    .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
    .and_then(|v| u32::try_from(v).ok())
}

// ─── Validation ──────────────────────────────────────────────────────────────

pub fn validate_daily_goal(ml: u32) -> Result<u32> {
  if (MIN_DAILY_GOAL_ML..=MAX_DAILY_GOAL_ML).contains(&ml) {
    Ok(ml)
  } else {
    Err(Error::InvalidSetting {
      key:    SettingKey::DailyGoal,
      reason: format!("{ml} ml is outside {MIN_DAILY_GOAL_ML}..={MAX_DAILY_GOAL_ML}"),
    })
  }
}

pub fn validate_cup_size(ml: u32) -> Result<u32> {
  if ml > 0 {
    Ok(ml)
  } else {
    Err(Error::InvalidSetting {
      key:    SettingKey::CupSize,
      reason: "cup size must be positive".into(),
    })
  }
}

pub fn validate_day_start_hour(hour: u8) -> Result<u8> {
  if hour <= 23 {
    Ok(hour)
  } else {
    Err(Error::InvalidSetting {
      key:    SettingKey::DayStartHour,
      reason: format!("{hour} is not an hour of the day"),
    })
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn key_names_are_stable() {
    let names: Vec<_> = SettingKey::ALL.iter().map(|k| k.as_str()).collect();
    assert_eq!(names, ["daily_goal_ml", "cup_size_ml", "theme", "day_start_hour"]);
    assert_eq!("theme".parse::<SettingKey>().unwrap(), SettingKey::Theme);
  }

  #[test]
  fn defaults_match_documented_values() {
    let s = Settings::default();
    assert_eq!((s.daily_goal_ml, s.cup_size_ml, s.day_start_hour), (2500, 250, 0));
    assert_eq!(s.theme, Theme::System);
  }

  #[test]
  fn goal_bounds_are_inclusive() {
    assert!(validate_daily_goal(500).is_ok());
    assert!(validate_daily_goal(10_000).is_ok());
    assert!(validate_daily_goal(499).is_err());
    assert!(validate_daily_goal(10_001).is_err());
  }

  #[test]
  fn cup_and_hour_validation() {
    assert!(validate_cup_size(0).is_err());
    assert!(validate_cup_size(1).is_ok());
    assert!(validate_day_start_hour(23).is_ok());
    assert!(matches!(
      validate_day_start_hour(24),
      Err(Error::InvalidSetting { key: SettingKey::DayStartHour, .. })
    ));
  }

  #[test]
  fn stored_values_round_trip_through_json() {
    let custom = Settings {
      daily_goal_ml:  3000,
      cup_size_ml:    330,
      theme:          Theme::Dark,
      day_start_hour: 6,
    };
    let mut loaded = Settings::default();
    for (key, value) in custom.to_values() {
      assert!(loaded.apply_stored(key, &value));
    }
    assert_eq!(loaded, custom);
  }

  #[test]
  fn undecodable_values_keep_the_default() {
    let mut s = Settings::default();
    assert!(!s.apply_stored(SettingKey::DailyGoal, &json!("lots")));
    assert!(!s.apply_stored(SettingKey::DayStartHour, &json!(42)));
    assert!(!s.apply_stored(SettingKey::Theme, &json!("neon")));
    assert_eq!(s, Settings::default());
    // Whole-valued floats are accepted.
    assert!(s.apply_stored(SettingKey::CupSize, &json!(300.0)));
    assert_eq!(s.cup_size_ml, 300);
  }
}
