use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use collection::collector::TickCollectionModule;
use processing::{recorder::ActivityRecorder, ProcessingModule};
use storage::{day_store::DayStoreImpl, observation::ObservationEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    browser_api::{status_file::StatusFileProbe, TabProbe},
    utils::clock::{Clock, DefaultClock},
};

pub mod args;
pub mod collection;
pub mod processing;
pub mod shutdown;
pub mod storage;

/// One tick. The recorder counts invocations, so this is also the unit of recorded time.
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Name of the status file the browser companion maintains inside the application directory.
pub const STATUS_FILE_NAME: &str = "status.json";

/// Represents the starting point for the daemon
pub async fn start_daemon(dir: PathBuf) -> Result<()> {
    std::env::set_current_dir("/")?;

    let (sender, receiver) = mpsc::channel::<ObservationEvent>(10);
    let probe = StatusFileProbe::new(dir.join(STATUS_FILE_NAME));

    let shutdown_token = CancellationToken::new();

    let collector = create_collector(sender, probe, &shutdown_token, DefaultClock);

    let processor = create_processor(dir.join("records"), receiver)?;

    let (_, collection_result, processing_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token),
        collector.run(),
        processor.run(),
    );

    if let Err(collection_result) = collection_result {
        error!("Collection module got an error {:?}", collection_result);
    }

    if let Err(processing_result) = processing_result {
        error!("Processing module got an error {:?}", processing_result);
    }

    Ok(())
}

fn create_collector(
    sender: mpsc::Sender<ObservationEvent>,
    probe: impl TabProbe + 'static,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
) -> TickCollectionModule {
    TickCollectionModule::new(
        sender,
        Box::new(probe),
        shutdown_token.clone(),
        DEFAULT_TICK_INTERVAL,
        Box::new(clock),
    )
}

fn create_processor(
    record_dir: PathBuf,
    receiver: mpsc::Receiver<ObservationEvent>,
) -> Result<ProcessingModule<ActivityRecorder<DayStoreImpl>>, anyhow::Error> {
    let store = DayStoreImpl::new(record_dir)?;
    let recorder = ActivityRecorder::new(store);
    Ok(ProcessingModule::new(receiver, recorder))
}

#[cfg(test)]
mod daemon_tests {
    use std::{sync::Arc, time::Duration};

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
    use tempfile::tempdir;
    use tokio::{sync::mpsc, time::Instant};
    use tokio_util::sync::CancellationToken;

    use crate::{
        browser_api::{MockTabProbe, TabSample},
        daemon::{
            create_collector, create_processor,
            storage::{
                day_store::{DayStore, DayStoreImpl},
                observation::ObservationEvent,
            },
        },
        utils::{clock::Clock, logging::TEST_LOGGING},
    };

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    fn test_samples() -> Vec<TabSample> {
        vec![
            TabSample {
                url: Some(Arc::from("https://docs.rs/tokio")),
                focused: true,
            },
            TabSample {
                url: Some(Arc::from("https://docs.rs/tokio")),
                focused: true,
            },
            TabSample {
                url: Some(Arc::from("https://github.com/pulls")),
                focused: true,
            },
            TabSample {
                url: Some(Arc::from("https://github.com/pulls")),
                focused: false,
            },
        ]
    }

    #[derive(Clone)]
    struct TestClock {
        start_time: DateTime<Local>,
        reference: Instant,
    }

    #[async_trait]
    impl Clock for TestClock {
        fn time(&self) -> DateTime<Local> {
            self.start_time + self.reference.elapsed()
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: tokio::time::Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    /// Very simple smoke test to check if the whole pipeline is working properly. It can be
    /// improved by warping time so that it takes 10 times less time, but for now we have what we
    /// have.
    #[tokio::test]
    async fn smoke_test_daemon() -> Result<()> {
        *TEST_LOGGING;
        let mut mock_probe = MockTabProbe::new();
        let mut samples = test_samples().into_iter().cycle();
        mock_probe
            .expect_sample()
            .returning(move || Ok(samples.next().unwrap()))
            .times(..7);

        let shutdown_token = CancellationToken::new();

        let (sender, receiver) = mpsc::channel::<ObservationEvent>(10);
        let test_clock = TestClock {
            start_time: Local.from_local_datetime(&TEST_START_DATE).unwrap(),
            reference: Instant::now(),
        };
        let collector = create_collector(sender, mock_probe, &shutdown_token, test_clock);

        let dir = tempdir()?;

        let processor = create_processor(dir.path().to_path_buf(), receiver)?;

        let (_, collection_result, processing_result) = tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(5500)).await;
                shutdown_token.cancel()
            },
            collector.run(),
            processor.run(),
        );

        collection_result?;
        processing_result?;

        let store = DayStoreImpl::new(dir.path().to_path_buf())?;
        let record = store.get(TEST_START_DATE.date()).await?;

        // Roughly 6 ticks fit into the window and at least one of them was unfocused, so the
        // record holds fewer ticks than ticks elapsed. Exact counts depend on scheduling.
        assert!((4..=5).contains(&record.total_ticks()), "{record:?}");
        assert!(record.domains.contains_key("docs.rs"));
        assert!(record.domains.contains_key("github.com"));

        Ok(())
    }
}
