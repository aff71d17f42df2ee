use crate::check::CheckService;
use crate::store::SubscriptionStore;

use std::sync::Arc;

pub struct AppState<F, S> {
    pub checks: Arc<CheckService<F, S>>,
    pub subscriptions: Arc<SubscriptionStore>,
}

impl<F, S> Clone for AppState<F, S> {
    fn clone(&self) -> Self {
        Self {
            checks: Arc::clone(&self.checks),
            subscriptions: Arc::clone(&self.subscriptions),
        }
    }
}
