use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    browser_api::{extract_domain, TabProbe},
    daemon::storage::observation::ObservationEvent,
    utils::clock::Clock,
};

/// Samples the browser once per tick and forwards observations downstream. While the browser
/// window is unfocused nothing is emitted at all, so no time accumulates; the recorder picks up
/// again on the next focused tick as if no gap had occurred.
pub struct TickCollectionModule {
    next: mpsc::Sender<ObservationEvent>,
    probe: Box<dyn TabProbe>,
    shutdown: CancellationToken,
    tick_interval: Duration,
    time_provider: Box<dyn Clock>,
}

impl TickCollectionModule {
    pub fn new(
        next: mpsc::Sender<ObservationEvent>,
        probe: Box<dyn TabProbe>,
        shutdown: CancellationToken,
        tick_interval: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            next,
            probe,
            shutdown,
            tick_interval,
            time_provider,
        }
    }

    fn observe(&mut self) -> Result<Option<ObservationEvent>> {
        let sample = self.probe.sample()?;
        if !sample.focused {
            return Ok(None);
        }
        let Some(url) = sample.url else {
            return Ok(None);
        };

        Ok(Some(ObservationEvent {
            domain: extract_domain(&url),
            url,
            timestamp: self.time_provider.time(),
        }))
    }

    /// Executes the collector event loop.
    pub async fn run(mut self) -> Result<()> {
        let mut tick_point = self.time_provider.instant();
        loop {
            tick_point += self.tick_interval;

            match self.observe() {
                Ok(Some(observation)) => {
                    debug!("Sending observation {:?}", observation);
                    self.next
                        .send(observation)
                        .await
                        .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                    info!("Successfully sent observation")
                }
                Ok(None) => {
                    debug!("Browser unfocused or idle, skipping tick")
                }
                Err(e) => {
                    error!("Encountered an error during sampling {:?}", e)
                }
            }

            tokio::select! {
                // Cancelation means we stop execution of the event loop. Which means we also drop
                // the sender channel and consequently stop the processing module.
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.time_provider.sleep_until(tick_point) => ()
            }
        }
    }
}
