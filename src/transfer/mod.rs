//! Converts the full store to and from portable representations. Export mirrors the store shape
//! as a JSON document (plus a flattened CSV form for spreadsheets); import validates entries one
//! date at a time and skips the broken ones instead of aborting.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use chrono::NaiveTime;
use serde::Deserialize;
use tracing::warn;

use crate::{
    daemon::storage::{
        day_store::DayStore,
        entities::{DayRecord, Session},
    },
    stats::StoreSnapshot,
    utils::time::{date_to_record_key, parse_record_key},
};

const TIME_FORMAT: &str = "%H:%M:%S";

/// Full-store JSON document, shaped exactly like the store mapping: date key to day record.
pub fn export_json(snapshot: &StoreSnapshot) -> Result<String> {
    let keyed = snapshot
        .iter()
        .map(|(date, record)| (date_to_record_key(*date), record))
        .collect::<BTreeMap<_, _>>();
    Ok(serde_json::to_string_pretty(&keyed)?)
}

/// Flattened tabular form, one row per session.
pub fn export_csv(snapshot: &StoreSnapshot) -> String {
    let mut out = String::from("Date,Start Time,End Time,Website,Time Spent (s),Sessions\n");
    for (date, record) in snapshot {
        let key = date_to_record_key(*date);
        for (domain, sessions) in &record.domains {
            for session in sessions {
                out += &format!(
                    "{key},{},{},{domain},{},{}\n",
                    session.start_time.format(TIME_FORMAT),
                    session.end_time.format(TIME_FORMAT),
                    session.time_spent,
                    session.visit_index,
                );
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Loose session shape used during import. Counts are signed so a negative value is a skipped
/// entry rather than a deserialization failure, and unknown extra fields are simply ignored.
#[derive(Debug, Deserialize)]
struct RawSession {
    url: String,
    #[serde(rename = "startTime")]
    start_time: String,
    #[serde(rename = "endTime")]
    end_time: String,
    #[serde(rename = "timeSpent")]
    time_spent: i64,
    #[serde(rename = "sessions")]
    visit_index: i64,
}

impl RawSession {
    fn validate(self) -> Option<Session> {
        let time_spent = u64::try_from(self.time_spent).ok()?;
        let visit_index = u32::try_from(self.visit_index).ok().filter(|v| *v >= 1)?;
        Some(Session {
            url: self.url,
            start_time: NaiveTime::parse_from_str(&self.start_time, TIME_FORMAT).ok()?,
            end_time: NaiveTime::parse_from_str(&self.end_time, TIME_FORMAT).ok()?,
            time_spent,
            visit_index,
        })
    }
}

fn validate_entry(value: serde_json::Value) -> Option<DayRecord> {
    let raw = serde_json::from_value::<BTreeMap<String, Vec<RawSession>>>(value).ok()?;
    let mut record = DayRecord::default();
    for (domain, sessions) in raw {
        let sessions = sessions
            .into_iter()
            .map(RawSession::validate)
            .collect::<Option<Vec<_>>>()?;
        record.domains.insert(domain, sessions);
    }
    Some(record)
}

/// Imports a JSON document in the export shape. Each valid date entry overwrites that date's
/// record; invalid entries are counted and skipped, never fatal.
pub async fn import_json<S: DayStore>(store: &S, raw: &str) -> Result<ImportSummary> {
    let document = serde_json::from_str::<serde_json::Value>(raw)?;
    let serde_json::Value::Object(entries) = document else {
        return Err(anyhow!("Import document is not a date-to-record mapping"));
    };

    let mut summary = ImportSummary::default();
    for (key, value) in entries {
        let valid = parse_record_key(&key).and_then(|date| Some((date, validate_entry(value)?)));
        match valid {
            Some((date, record)) => {
                store.put(date, &record).await?;
                summary.imported += 1;
            }
            None => {
                warn!("Skipping malformed import entry for key {key:?}");
                summary.skipped += 1;
            }
        }
    }
    Ok(summary)
}

/// Removes every stored record.
pub async fn clear_all<S: DayStore>(store: &S) -> Result<()> {
    store.clear().await
}
