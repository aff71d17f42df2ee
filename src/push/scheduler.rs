use crate::check::CheckService;
use crate::ports;

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub(crate) struct SchedulerHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Cancels the loop and waits for it to exit. A cycle in flight is
    /// dropped before it persists anything.
    pub(crate) async fn stop(self) -> Result<(), tokio::task::JoinError> {
        self.cancel.cancel();
        self.handle.await
    }
}

/// Runs a check cycle immediately, then again after every `interval`.
pub(crate) struct CheckScheduler<T, F, S> {
    time: T,
    service: Arc<CheckService<F, S>>,
    interval: Duration,
}

impl<T, F, S> CheckScheduler<T, F, S>
where
    T: ports::CycleClock,
    F: ports::ScheduleFetcher,
    S: ports::PushSender,
{
    pub(crate) fn new(time: T, service: Arc<CheckService<F, S>>, interval: Duration) -> Self {
        Self {
            time,
            service,
            interval,
        }
    }

    pub(crate) fn spawn(self, cancel: CancellationToken) -> SchedulerHandle {
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            run_loop(self.time, self.service, self.interval, token).await;
        });
        SchedulerHandle { cancel, handle }
    }
}

async fn run_loop<T, F, S>(
    time: T,
    service: Arc<CheckService<F, S>>,
    interval: Duration,
    cancel: CancellationToken,
) where
    T: ports::CycleClock,
    F: ports::ScheduleFetcher,
    S: ports::PushSender,
{
    info!(interval_secs = interval.as_secs(), "check scheduler started");

    loop {
        debug!(at = %time.now(), "checking pilot schedule");
        tokio::select! {
            _ = cancel.cancelled() => break,
            result = service.run_cycle() => match result {
                Ok(report) => info!(
                    changes = report.changes.len(),
                    alerts = report.alerts.len(),
                    "check cycle finished"
                ),
                Err(err) => error!(%err, "check cycle failed"),
            },
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = time.wait_for_next_cycle(interval) => {}
        }
    }

    info!("check scheduler stopped");
}
