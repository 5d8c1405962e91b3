//! `dailyme` — command-line front end for the dailyme hydration log.
//!
//! # Usage
//!
//! ```
//! dailyme status
//! dailyme add 330 --type tea
//! dailyme cup
//! dailyme undo
//! dailyme --date 2026-03-04 log
//! dailyme settings goal 3000
//! dailyme export --out hydration.json
//! ```

mod app;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use app::App;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dailyme_core::{entry::DrinkType, entry::EntryId, settings::Theme};
use dailyme_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "~/.config/dailyme/config.toml";
const DEFAULT_STORE_PATH: &str = "~/.local/share/dailyme/dailyme.db";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "dailyme", version, about = "Track how much you drink each day")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
  config: PathBuf,

  /// Path to the SQLite database. Overrides `store_path` from the config.
  #[arg(long, global = true, value_name = "PATH", env = "DAILYME_STORE")]
  store: Option<PathBuf>,

  /// Logical day to operate on (YYYY-MM-DD). Defaults to today.
  #[arg(long, global = true)]
  date: Option<NaiveDate>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Show the day's progress (the default).
  Status {
    /// Print machine-readable JSON instead of text.
    #[arg(long)]
    json: bool,
  },

  /// Log a custom amount.
  Add {
    /// Amount in millilitres.
    #[arg(value_parser = clap::value_parser!(u32).range(1..=5000))]
    ml:   u32,
    #[arg(long = "type", default_value_t = DrinkType::Water)]
    kind: DrinkType,
  },

  /// Log one cup of the configured size.
  Cup {
    #[arg(long = "type", default_value_t = DrinkType::Water)]
    kind: DrinkType,
  },

  /// Log one 500 ml glass.
  Glass {
    #[arg(long = "type", default_value_t = DrinkType::Water)]
    kind: DrinkType,
  },

  /// Remove the most recent entry of the day.
  Undo,

  /// Remove one entry by id.
  Remove { id: EntryId },

  /// Delete every entry of the day.
  Reset {
    /// Required; resetting cannot be undone.
    #[arg(long)]
    yes: bool,
  },

  /// Show the last seven days.
  Week,

  /// List the day's entries.
  Log,

  /// Show or change settings.
  #[command(subcommand)]
  Settings(SettingsCommand),

  /// Write every entry as JSON.
  Export {
    /// Output file; defaults to `dailyme-hydration-<today>.json`. Use `-`
    /// for stdout.
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
  },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
  /// Print every setting.
  Show,
  /// Set the daily goal in millilitres.
  Goal { ml: u32 },
  /// Set the cup size in millilitres.
  Cup { ml: u32 },
  /// Set the theme (light, dark or system).
  Theme { theme: Theme },
  /// Set the hour (0-23) at which a new logical day begins.
  DayStart { hour: u8 },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Settings read from the config file and `DAILYME_*` environment variables.
#[derive(Deserialize, Debug)]
struct CliConfig {
  store_path: PathBuf,
}

fn load_config(path: &Path) -> Result<CliConfig> {
  config::Config::builder()
    .set_default("store_path", DEFAULT_STORE_PATH)?
    .add_source(config::File::from(expand_tilde(path)).required(false))
    .add_source(config::Environment::with_prefix("DAILYME"))
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise config")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let cfg = load_config(&args.config)?;

  // CLI flag overrides config file, which overrides the default.
  let store_path = expand_tilde(args.store.as_deref().unwrap_or(&cfg.store_path));
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .map_err(dailyme_core::Error::unavailable)
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let app = App::start(store, args.date).await?;
  app
    .run(args.command.unwrap_or(Command::Status { json: false }))
    .await
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn args_are_well_formed() { Args::command().debug_assert(); }

  #[test]
  fn add_rejects_out_of_range_amounts() {
    assert!(Args::try_parse_from(["dailyme", "add", "0"]).is_err());
    assert!(Args::try_parse_from(["dailyme", "add", "5001"]).is_err());
    let args = Args::try_parse_from(["dailyme", "add", "330", "--type", "tea"]).unwrap();
    assert!(matches!(args.command, Some(Command::Add { ml: 330, kind: DrinkType::Tea })));
  }

  #[test]
  fn date_is_accepted_after_the_subcommand() {
    let args = Args::try_parse_from(["dailyme", "log", "--date", "2026-03-04"]).unwrap();
    assert_eq!(args.date, NaiveDate::from_ymd_opt(2026, 3, 4));
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/x/y.db")), PathBuf::from(home).join("x/y.db"));
    assert_eq!(expand_tilde(Path::new("/abs/y.db")), PathBuf::from("/abs/y.db"));
  }
}
