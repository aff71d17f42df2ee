use crate::error::FetchError;
use crate::types::schedule::Snapshot;

pub trait ScheduleFetcher: Clone + Send + Sync + 'static {
    type Fut<'a>: Future<Output = Result<Snapshot, FetchError>> + Send + 'a
    where
        Self: 'a;

    fn fetch<'a>(&'a self) -> Self::Fut<'a>;
}
