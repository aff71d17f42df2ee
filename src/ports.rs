pub mod fetch;
pub mod push;
pub mod time;

pub use fetch::ScheduleFetcher;
pub use push::PushSender;
pub use time::CycleClock;
