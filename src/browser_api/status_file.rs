use std::{
    path::PathBuf,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Result;
use serde::Deserialize;
use tracing::warn;

use super::{TabProbe, TabSample};

/// How old a status file may be before the browser is considered gone. The companion refreshes
/// the file on every tab/focus change and at least once a second while running.
const STALE_AFTER_SECS: u64 = 5;

/// Shape the browser-side companion writes. Extra fields are ignored so companion versions can
/// evolve independently.
#[derive(Debug, Deserialize)]
struct StatusFile {
    url: Option<Arc<str>>,
    focused: bool,
    #[serde(rename = "updatedAt")]
    updated_at: Option<u64>,
}

/// Reads the active-tab status file maintained by the browser companion. A missing, unreadable
/// or stale file means no activity, never an error; the browser simply isn't there.
pub struct StatusFileProbe {
    path: PathBuf,
}

impl StatusFileProbe {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn is_stale(updated_at: Option<u64>) -> bool {
        let Some(updated_at) = updated_at else {
            return false;
        };
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|v| v.as_secs())
            .unwrap_or(0);
        now.saturating_sub(updated_at) > STALE_AFTER_SECS
    }
}

impl TabProbe for StatusFileProbe {
    fn sample(&mut self) -> Result<TabSample> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(TabSample::inactive())
            }
            Err(e) => return Err(e.into()),
        };

        let status = match serde_json::from_str::<StatusFile>(&raw) {
            Ok(status) => status,
            Err(e) => {
                // A torn write from the companion. Skip this tick.
                warn!("Status file {:?} holds illegal json: {e}", self.path);
                return Ok(TabSample::inactive());
            }
        };

        if Self::is_stale(status.updated_at) {
            return Ok(TabSample::inactive());
        }

        Ok(TabSample {
            url: status.url,
            focused: status.focused,
        })
    }
}
