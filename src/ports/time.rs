use std::time::Duration;

use time::OffsetDateTime;

/// Wall clock and pacing for the check scheduler.
///
/// Production waits on tokio timers; scheduler tests hand out waits that
/// only finish when the test releases them.
pub trait CycleClock: Clone + Send + Sync + 'static {
    type Wait<'a>: Future<Output = ()> + Send + 'a
    where
        Self: 'a;

    /// Stamped on the scheduler's per-cycle log line.
    fn now(&self) -> OffsetDateTime;

    /// Resolves once `interval` has passed since the last cycle finished.
    fn wait_for_next_cycle<'a>(&'a self, interval: Duration) -> Self::Wait<'a>;
}
