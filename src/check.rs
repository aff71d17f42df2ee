//! One check cycle: fetch, diff against the stored snapshot, render, notify,
//! persist, prune.

use crate::config::AppConfig;
use crate::error::{CheckError, FetchError};
use crate::ports::{PushSender, ScheduleFetcher};
use crate::push;
use crate::store::{SnapshotStore, SubscriptionStore};
use crate::types::changes::{ChangeSet, TimeChange};
use crate::types::schedule::Snapshot;

pub mod alerts;
pub mod diff;

use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Result of a completed cycle, whether or not anyone was notified.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    #[serde(with = "time::serde::rfc3339")]
    pub checked_at: OffsetDateTime,
    pub changes: ChangeSet,
    pub alerts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CheckSettings {
    pub restriction_keywords: Vec<String>,
    pub max_lines_per_push: usize,
}

impl CheckSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            restriction_keywords: config.restriction_keywords.clone(),
            max_lines_per_push: config.max_lines_per_push,
        }
    }
}

/// Shared by the background scheduler and the on-demand HTTP check.
///
/// Cycles are serialized so two callers never diff against the same
/// previous snapshot.
pub struct CheckService<F, S> {
    fetcher: F,
    sender: Option<S>,
    snapshots: SnapshotStore,
    subscriptions: Arc<SubscriptionStore>,
    settings: CheckSettings,
    cycle: tokio::sync::Mutex<()>,
}

impl<F, S> CheckService<F, S>
where
    F: ScheduleFetcher,
    S: PushSender,
{
    pub fn new(
        fetcher: F,
        sender: Option<S>,
        snapshots: SnapshotStore,
        subscriptions: Arc<SubscriptionStore>,
        settings: CheckSettings,
    ) -> Self {
        Self {
            fetcher,
            sender,
            snapshots,
            subscriptions,
            settings,
            cycle: tokio::sync::Mutex::new(()),
        }
    }

    /// Runs one full cycle.
    ///
    /// A fetch failure leaves every store untouched. The new snapshot is
    /// persisted even when nothing changed.
    pub async fn run_cycle(&self) -> Result<CheckReport, CheckError> {
        let _cycle = self.cycle.lock().await;

        let current = self.fetcher.fetch().await?;
        let previous = self.snapshots.load();
        let changes = diff::compute_changes(
            &previous,
            &current,
            &self.settings.restriction_keywords,
        );
        let alerts = alerts::render(&changes);

        if changes.is_empty() {
            debug!(ships = current.len(), "no notifiable schedule changes");
        } else {
            info!(
                ships = current.len(),
                changes = changes.len(),
                "pilot schedule changed"
            );
            self.notify(&alerts).await;
        }

        self.snapshots.save(&current)?;
        push::cleanup::prune(&current, &self.subscriptions)?;

        Ok(CheckReport {
            checked_at: OffsetDateTime::now_utc(),
            changes,
            alerts,
        })
    }

    /// Fetches the live schedule without touching any store.
    pub async fn current_schedule(&self) -> Result<Snapshot, FetchError> {
        self.fetcher.fetch().await
    }

    /// Prunes favorites against the live schedule, as done once at startup.
    pub async fn prune_favorites(&self) -> Result<usize, CheckError> {
        let _cycle = self.cycle.lock().await;
        let latest = self.fetcher.fetch().await?;
        Ok(push::cleanup::prune(&latest, &self.subscriptions)?)
    }

    /// Sends every subscriber a synthetic time change for each favorite.
    pub async fn send_test_alert(&self) -> Vec<String> {
        let time_changes = self
            .subscriptions
            .subscribers()
            .into_iter()
            .flat_map(|subscriber| subscriber.favorites)
            .map(|ship_name| TimeChange {
                id: "1".to_string(),
                ship_name,
                before: "10:00".to_string(),
                after: "11:00".to_string(),
            })
            .collect();
        let changes = ChangeSet {
            time_changes,
            ..Default::default()
        };
        let alerts = alerts::render(&changes);
        self.notify(&alerts).await;
        alerts
    }

    async fn notify(&self, alerts: &[String]) {
        match self.sender.as_ref() {
            Some(sender) => {
                push::dispatch(
                    sender,
                    alerts,
                    &self.subscriptions,
                    self.settings.max_lines_per_push,
                )
                .await;
            }
            None => debug!(alerts = alerts.len(), "push delivery disabled, skipping dispatch"),
        }
    }
}
