//! Reactive state containers.
//!
//! Each container owns a [`tokio::sync::watch`] channel. Front ends call
//! [`subscribe`](LogState::subscribe) and re-render whenever a new snapshot is
//! published; every committed mutation publishes exactly one snapshot.

mod log_state;
mod settings_state;

pub use log_state::{LogSnapshot, LogState, WEEK_LENGTH};
pub use settings_state::{SettingsSnapshot, SettingsState};
