use crate::adapters::FcmSender;
use crate::config;
use crate::error::DeliveryError;
use crate::ports::push::PushSender;
use crate::store::SubscriptionStore;
use crate::types::push::{ServiceAccount, token_label};

pub(crate) mod cleanup;
mod scheduler;

pub(crate) use scheduler::CheckScheduler;

use tracing::{debug, error, info, warn};

/// What happened to each subscriber during one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub delivered: usize,
    pub skipped: usize,
    pub unsubscribed: usize,
    pub failed: usize,
}

/// Builds the FCM sender, or `None` when delivery is not configured.
pub fn maybe_build_sender(config: &config::AppConfig) -> Option<FcmSender> {
    let Some(raw) = config.fcm_credentials.as_deref() else {
        warn!("push notifications disabled: no FCM credentials configured");
        return None;
    };

    let account = match ServiceAccount::from_json(raw) {
        Ok(account) => account,
        Err(err) => {
            error!(%err, "push notifications disabled");
            return None;
        }
    };

    match FcmSender::new(account, config.delivery_timeout) {
        Ok(sender) => Some(sender),
        Err(err) => {
            error!(%err, "push notifications disabled");
            None
        }
    }
}

/// Sends each subscriber the alerts naming one of their favorite ships.
///
/// An alert matches when its text contains a favorite name (case-sensitive),
/// so a name that is part of another ship's name matches that ship too.
/// Subscribers without a match are never contacted. At most `max_lines`
/// matched lines are sent, in alert order. Tokens the transport rejects as
/// invalid are removed from the store; other failures are logged and left
/// for the next cycle.
pub async fn dispatch<S: PushSender>(
    sender: &S,
    alerts: &[String],
    subscriptions: &SubscriptionStore,
    max_lines: usize,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();
    if alerts.is_empty() {
        return summary;
    }

    for subscriber in subscriptions.subscribers() {
        let lines = matching_alerts(alerts, &subscriber.favorites, max_lines);
        if lines.is_empty() {
            summary.skipped += 1;
            continue;
        }

        let token = token_label(&subscriber.token);
        debug!(%token, lines = lines.len(), alarm_mode = subscriber.alarm_mode, "sending push");
        match sender
            .send(&subscriber.token, &lines, subscriber.alarm_mode)
            .await
        {
            Ok(()) => summary.delivered += 1,
            Err(DeliveryError::InvalidToken) => {
                info!(%token, "removing subscriber with invalid delivery token");
                summary.unsubscribed += 1;
                if let Err(err) = subscriptions.remove_token(&subscriber.token) {
                    error!(%token, %err, "failed to remove invalid token");
                }
            }
            Err(err) => {
                warn!(%token, %err, "push delivery failed");
                summary.failed += 1;
            }
        }
    }

    info!(
        delivered = summary.delivered,
        skipped = summary.skipped,
        unsubscribed = summary.unsubscribed,
        failed = summary.failed,
        "push dispatch finished"
    );
    summary
}

fn matching_alerts(alerts: &[String], favorites: &[String], max_lines: usize) -> Vec<String> {
    alerts
        .iter()
        .filter(|alert| {
            favorites
                .iter()
                .any(|name| !name.is_empty() && alert.contains(name.as_str()))
        })
        .take(max_lines)
        .cloned()
        .collect()
}
