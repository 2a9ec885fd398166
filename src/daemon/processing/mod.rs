use anyhow::Result;
use module::EventProcessor;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info};

use super::storage::observation::ObservationEvent;

pub mod module;
pub mod recorder;

/// Drives an [EventProcessor] from the observation channel. A failed write is only logged; the
/// observation is dropped and the next tick tries again with fresh state.
pub struct ProcessingModule<Processor> {
    receiver: Receiver<ObservationEvent>,
    processor: Processor,
}

impl<P: EventProcessor> ProcessingModule<P> {
    pub fn new(receiver: Receiver<ObservationEvent>, processor: P) -> Self {
        Self {
            receiver,
            processor,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(observation) = self.receiver.recv().await {
            debug!("Processing observation {:?}", observation);
            match self.processor.process_next(observation.clone()).await {
                Ok(_) => {
                    info!("Processed observation {:?}", observation)
                }
                Err(e) => {
                    error!("Error processing observation {:?}: {e:?}", observation)
                }
            }
        }

        let result = self.processor.finalize().await;
        self.receiver.close();
        result
    }
}
