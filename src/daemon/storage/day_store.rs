use std::{
    collections::BTreeMap,
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use futures::{stream, StreamExt};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use crate::utils::time::{date_to_record_key, parse_record_key};

use super::entities::DayRecord;

/// Interface for abstracting storage of day records. One record holds everything observed for a
/// single local calendar date; a date that was never written reads back as an empty record.
pub trait DayStore {
    /// Retrieves the record for a date. Absence is not an error, it is an empty record.
    fn get(&self, date: NaiveDate) -> impl Future<Output = Result<DayRecord>>;

    /// Replaces the whole record for a date. Writes for the same date are serialized through an
    /// exclusive file lock, so a reader never observes a partially written record.
    fn put(&self, date: NaiveDate, record: &DayRecord) -> impl Future<Output = Result<()>>;

    /// Snapshot of every stored date. Used by aggregation and export.
    fn get_all(&self) -> impl Future<Output = Result<BTreeMap<NaiveDate, DayRecord>>>;

    /// Removes every stored record.
    fn clear(&self) -> impl Future<Output = Result<()>>;
}

/// The main realization of [DayStore]. Each date lives in its own `YYYY-MM-DD.json` file under
/// the record directory.
pub struct DayStoreImpl {
    record_dir: PathBuf,
}

impl DayStoreImpl {
    pub fn new(record_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&record_dir)?;

        Ok(Self { record_dir })
    }

    fn record_path(&self, date: NaiveDate) -> PathBuf {
        self.record_dir
            .join(format!("{}.json", date_to_record_key(date)))
    }

    /// Dates of every record file currently present, in ascending order. Files that don't look
    /// like record files are left alone.
    async fn stored_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut entries = tokio::fs::read_dir(&self.record_dir).await?;
        let mut dates = vec![];
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|v| v.to_str()) else {
                continue;
            };
            if let Some(date) = parse_record_key(stem) {
                dates.push(date);
            }
        }
        dates.sort_unstable();
        Ok(dates)
    }

    async fn read_record(path: &Path) -> Result<DayRecord> {
        async fn extract(path: &Path) -> std::result::Result<String, std::io::Error> {
            debug!("Extracting {path:?}");
            let mut file = File::open(path).await?;
            file.lock_shared()?;
            let mut raw = String::new();
            let read = file.read_to_string(&mut raw).await;
            file.unlock_async().await?;
            read?;
            Ok(raw)
        }

        let raw = match extract(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(DayRecord::default()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<DayRecord>(&raw) {
            Ok(record) => Ok(record),
            Err(e) => {
                // Degrade to an empty record instead of failing the read. Records are replaced
                // atomically, so this only happens when something else mangled the file.
                warn!("Record file {path:?} holds illegal json: {e}");
                Ok(DayRecord::default())
            }
        }
    }
}

impl DayStore for DayStoreImpl {
    async fn get(&self, date: NaiveDate) -> Result<DayRecord> {
        Self::read_record(&self.record_path(date)).await
    }

    async fn put(&self, date: NaiveDate, record: &DayRecord) -> Result<()> {
        let target = self.record_path(date);
        // The replacement is staged next to the record and renamed over it once fully synced,
        // so a write cut partway through leaves the previous record untouched.
        let staging = target.with_extension("json.tmp");

        let mut file = File::create(&staging).await?;
        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let written = Self::write_record(&mut file, record).await;
        file.unlock_async().await?;
        drop(file);
        written?;

        tokio::fs::rename(&staging, &target).await?;
        Ok(())
    }

    async fn get_all(&self) -> Result<BTreeMap<NaiveDate, DayRecord>> {
        let dates = self.stored_dates().await?;

        let records = stream::iter(dates)
            .map(|date| async move { (date, Self::read_record(&self.record_path(date)).await) })
            .buffered(4)
            .collect::<Vec<_>>()
            .await;

        let mut snapshot = BTreeMap::new();
        for (date, record) in records {
            snapshot.insert(date, record?);
        }
        Ok(snapshot)
    }

    async fn clear(&self) -> Result<()> {
        for date in self.stored_dates().await? {
            tokio::fs::remove_file(self.record_path(date)).await?;
        }
        Ok(())
    }
}

impl DayStoreImpl {
    async fn write_record(file: &mut File, record: &DayRecord) -> Result<()> {
        let buffer = serde_json::to_vec_pretty(record)?;
        file.write_all(&buffer).await?;
        file.sync_all().await?;
        Ok(())
    }
}
