//! Full-database export of log entries as JSON.

use chrono::NaiveDate;

use crate::{Error, Result, store::HydrationStore};

/// Every stored entry as a pretty-printed JSON array of
/// `{id, date, timestamp, amount_ml, type}` objects, oldest first.
pub async fn export_entries<S: HydrationStore>(store: &S) -> Result<String> {
  let entries = store.all_entries().await.map_err(Error::read)?;
  Ok(serde_json::to_string_pretty(&entries)?)
}

/// Suggested file name for an export taken on `today`.
pub fn export_file_name(today: NaiveDate) -> String {
  format!("dailyme-hydration-{}.json", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use serde_json::Value;

  use super::*;
  use crate::{
    entry::{DrinkType, LogEntry},
    memory::MemoryStore,
  };

  #[tokio::test]
  async fn exports_a_flat_array_with_stable_fields() {
    let store = MemoryStore::new();
    let d1 = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
    let d2 = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
    let t = Utc.with_ymd_and_hms(2026, 3, 5, 8, 0, 0).unwrap();
    store.put_entry(LogEntry::new(d2, t, 500, DrinkType::Coffee).unwrap()).await.unwrap();
    store
      .put_entry(LogEntry::new(d1, t - chrono::Duration::days(1), 250, DrinkType::Water).unwrap())
      .await
      .unwrap();

    let json: Value = serde_json::from_str(&export_entries(&store).await.unwrap()).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["date"], "2026-03-04");
    assert_eq!(rows[1]["type"], "coffee");
    assert_eq!(rows[1]["amount_ml"], 500);
    assert_eq!(rows[1]["timestamp"], t.timestamp_millis());
    let mut keys: Vec<_> = rows[0].as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, ["amount_ml", "date", "id", "timestamp", "type"]);
  }

  #[tokio::test]
  async fn empty_store_exports_an_empty_array() {
    let store = MemoryStore::new();
    assert_eq!(export_entries(&store).await.unwrap(), "[]");
  }

  #[test]
  fn file_name_carries_the_date() {
    let today = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
    assert_eq!(export_file_name(today), "dailyme-hydration-2026-03-05.json");
  }
}
