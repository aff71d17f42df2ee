use std::time::Duration;

use time::OffsetDateTime;

use crate::ports;

mod fcm;
mod pilot_table;

pub use fcm::FcmSender;
pub use pilot_table::PilotTableFetcher;

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl ports::CycleClock for TokioClock {
    type Wait<'a>
        = tokio::time::Sleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn wait_for_next_cycle<'a>(&'a self, interval: Duration) -> Self::Wait<'a> {
        tokio::time::sleep(interval)
    }
}
