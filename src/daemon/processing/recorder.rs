use std::sync::Arc;

use anyhow::Result;
use chrono::Timelike;
use tracing::debug;

use crate::{
    daemon::storage::{
        day_store::DayStore,
        entities::Session,
        observation::ObservationEvent,
    },
    utils::time::ticks_to_badge,
};

use super::module::EventProcessor;

/// Decides, once per tick, whether an observation extends the current visit or starts a new one,
/// and persists the result. This is the only writer of the day store.
///
/// Ticks are counted, not timed: one observation is one tick unit, regardless of how much real
/// time passed since the previous one. A scheduling gap therefore undercounts silently instead of
/// spiking, which is what keeps suspend/resume cycles from double-counting.
pub struct ActivityRecorder<S> {
    store: S,
    /// The (domain, url) of the previous tick's observation. A session is only extended while
    /// the visit is uninterrupted; looking at another domain and coming back starts a new visit
    /// even when the url is unchanged.
    current_visit: Option<(Arc<str>, Arc<str>)>,
    running_total: Option<u64>,
}

impl<S: DayStore> ActivityRecorder<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            current_visit: None,
            running_total: None,
        }
    }

    /// Today's accumulated ticks for the domain of the last observation. This is what a
    /// badge-style display shows; it clears whenever the active page has no trackable domain.
    pub fn running_total(&self) -> Option<u64> {
        self.running_total
    }

    pub async fn record_observation(&mut self, observation: ObservationEvent) -> Result<()> {
        let Some(domain) = observation.domain.clone() else {
            self.current_visit = None;
            self.running_total = None;
            return Ok(());
        };

        let today = observation.timestamp.date_naive();
        // Sub-second precision doesn't survive the record format and ticks are whole seconds
        // anyway.
        let now = observation
            .timestamp
            .time()
            .with_nanosecond(0)
            .expect("zero is a valid nanosecond");

        let continued = self
            .current_visit
            .as_ref()
            .map_or(false, |(d, u)| *d == domain && *u == observation.url);

        let mut record = self.store.get(today).await?;
        let sessions = record.domains.entry(domain.to_string()).or_default();

        let extended = match sessions.last_mut() {
            Some(last) if continued && last.url == *observation.url => {
                last.extend(now);
                true
            }
            _ => false,
        };
        if !extended {
            let visit_index = sessions.last().map(|last| last.visit_index).unwrap_or(0) + 1;
            sessions.push(Session::started(&*observation.url, now, visit_index));
        }

        self.store.put(today, &record).await?;

        let total = record.domain_ticks(&domain);
        debug!("Recorded {domain}, badge {}", ticks_to_badge(total));
        self.current_visit = Some((domain, observation.url));
        self.running_total = Some(total);
        Ok(())
    }
}

impl<S: DayStore> EventProcessor for ActivityRecorder<S> {
    async fn process_next(&mut self, message: ObservationEvent) -> Result<()> {
        self.record_observation(message).await
    }

    async fn finalize(&mut self) -> Result<()> {
        // Every put is a full, self-consistent replacement; whatever committed last is the
        // durable state, so there is nothing left to flush.
        debug!("Recorder finalized");
        Ok(())
    }
}
