//! Summary recalculation.
//!
//! [`recalculate_summary`] is the only code path that writes summaries. Any
//! change to the entries of a date must be followed by a call for that date
//! before its summary is considered valid.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::{Error, Result, store::HydrationStore, summary::DailySummary};

/// Rebuild and persist the summary for `date` from its stored entries.
///
/// `goal_ml` is snapshotted into the summary and is not revisited until the
/// next recalculation.
pub async fn recalculate_summary<S>(
  store: &S,
  date: NaiveDate,
  goal_ml: u32,
  now: DateTime<Utc>,
) -> Result<DailySummary>
where
  S: HydrationStore + ?Sized,
{
  let entries = store.entries_for_date(date).await.map_err(Error::read)?;
  let summary = DailySummary::from_entries(date, &entries, goal_ml, now);

  store
    .upsert_summary(summary.clone())
    .await
    .map_err(Error::write)?;

  debug!(
    %date,
    total_ml = summary.total_ml,
    entries = summary.entries_count,
    goal_reached = summary.goal_reached,
    "recalculated summary"
  );
  Ok(summary)
}
