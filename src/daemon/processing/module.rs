use anyhow::Result;

use crate::daemon::storage::observation::ObservationEvent;

/// Represents an observation processor. This should realistically be able to abstract over
/// different options: local recording, remote submission.
pub trait EventProcessor {
    fn process_next(
        &mut self,
        message: ObservationEvent,
    ) -> impl std::future::Future<Output = Result<()>>;

    fn finalize(&mut self) -> impl std::future::Future<Output = Result<()>>;
}
