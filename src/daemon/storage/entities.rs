use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::Deserialize;
use serde::Serialize;

/// One contiguous visit to a specific url within a domain. Only the last session of a domain may
/// still be extended; every earlier one is immutable once superseded.
///
/// `visit_index` is serialized as `sessions` to stay compatible with data files exported by the
/// browser-side companion.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct Session {
    pub url: String,
    #[serde(rename = "startTime", with = "time_of_day")]
    pub start_time: NaiveTime,
    #[serde(rename = "endTime", with = "time_of_day")]
    pub end_time: NaiveTime,
    #[serde(rename = "timeSpent")]
    pub time_spent: u64,
    #[serde(rename = "sessions")]
    pub visit_index: u32,
}

impl Session {
    /// A freshly observed visit. One observation has already happened, so it starts at one tick.
    pub fn started(url: impl Into<String>, now: NaiveTime, visit_index: u32) -> Self {
        Self {
            url: url.into(),
            start_time: now,
            end_time: now,
            time_spent: 1,
            visit_index,
        }
    }

    /// Attributes one more tick to this session and moves its end marker forward.
    pub fn extend(&mut self, now: NaiveTime) {
        self.time_spent += 1;
        self.end_time = now;
    }
}

mod time_of_day {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M:%S";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// All sessions recorded for one calendar date, grouped by domain. Session lists are append-only
/// during the day and kept in creation order.
#[derive(PartialEq, Eq, Debug, Default, Serialize, Deserialize, Clone)]
#[serde(transparent)]
pub struct DayRecord {
    pub domains: BTreeMap<String, Vec<Session>>,
}

impl DayRecord {
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Sum of `time_spent` over every session of every domain.
    pub fn total_ticks(&self) -> u64 {
        self.domains
            .values()
            .flatten()
            .map(|session| session.time_spent)
            .sum()
    }

    /// Running total for one domain, used for the badge-style display.
    pub fn domain_ticks(&self, domain: &str) -> u64 {
        self.domains
            .get(domain)
            .map(|sessions| sessions.iter().map(|s| s.time_spent).sum())
            .unwrap_or(0)
    }
}
