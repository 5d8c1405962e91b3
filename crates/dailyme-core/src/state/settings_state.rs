//! [`SettingsState`] — user preferences with optimistic writes.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
  Error, Result,
  settings::{
    SettingKey, Settings, Theme, validate_cup_size, validate_daily_goal, validate_day_start_hour,
  },
  store::HydrationStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsSnapshot {
  pub settings: Settings,
  /// `false` until [`SettingsState::load`] has completed once.
  pub ready:    bool,
}

pub struct SettingsState<S> {
  store: Arc<S>,
  tx:    watch::Sender<SettingsSnapshot>,
}

impl<S: HydrationStore> SettingsState<S> {
  /// A container holding the hard-coded defaults, not yet ready.
  pub fn new(store: Arc<S>) -> Self {
    let (tx, _rx) = watch::channel(SettingsSnapshot::default());
    Self { store, tx }
  }

  pub fn subscribe(&self) -> watch::Receiver<SettingsSnapshot> { self.tx.subscribe() }

  pub fn snapshot(&self) -> SettingsSnapshot { *self.tx.borrow() }

  pub fn current(&self) -> Settings { self.tx.borrow().settings }

  pub fn is_ready(&self) -> bool { self.tx.borrow().ready }

  /// Ensure defaults exist, then read every key. Missing or undecodable
  /// values fall back to the defaults. On failure nothing changes.
  pub async fn load(&self) -> Result<Settings> {
    let wrote = self.store.init_defaults().await.map_err(|e| {
      warn!(error = %e, "failed to initialise default settings");
      Error::write(e)
    })?;
    if wrote {
      debug!("wrote default settings");
    }

    let mut settings = Settings::default();
    for key in SettingKey::ALL {
      let stored = self.store.get_setting(key).await.map_err(|e| {
        warn!(%key, error = %e, "failed to read setting");
        Error::read(e)
      })?;
      if let Some(value) = stored
        && !settings.apply_stored(key, &value)
      {
        warn!(%key, %value, "ignoring invalid stored setting");
      }
    }

    self.tx.send_replace(SettingsSnapshot { settings, ready: true });
    Ok(settings)
  }

  pub async fn set_daily_goal(&self, ml: u32) -> Result<()> {
    let ml = validate_daily_goal(ml)?;
    self.write(SettingKey::DailyGoal, Value::from(ml), |s| s.daily_goal_ml = ml).await
  }

  pub async fn set_cup_size(&self, ml: u32) -> Result<()> {
    let ml = validate_cup_size(ml)?;
    self.write(SettingKey::CupSize, Value::from(ml), |s| s.cup_size_ml = ml).await
  }

  pub async fn set_theme(&self, theme: Theme) -> Result<()> {
    self.write(SettingKey::Theme, Value::from(theme.as_str()), |s| s.theme = theme).await
  }

  pub async fn set_day_start_hour(&self, hour: u8) -> Result<()> {
    let hour = validate_day_start_hour(hour)?;
    self.write(SettingKey::DayStartHour, Value::from(hour), |s| s.day_start_hour = hour).await
  }

  /// Publish the new value first, then persist. A failed write is reported
  /// but the in-memory value is kept.
  async fn write(
    &self,
    key: SettingKey,
    value: Value,
    apply: impl FnOnce(&mut Settings),
  ) -> Result<()> {
    self.tx.send_modify(|snap| apply(&mut snap.settings));
    self.store.set_setting(key, value).await.map_err(|e| {
      warn!(%key, error = %e, "failed to persist setting; keeping in-memory value");
      Error::write(e)
    })
  }
}
