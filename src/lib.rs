pub mod adapters;
pub mod app;
pub mod check;
pub mod config;
pub mod error;
pub mod logging;
pub mod ports;
pub mod push;
pub mod state;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;

use crate::adapters::{FcmSender, PilotTableFetcher, TokioClock};
use crate::check::{CheckReport, CheckService, CheckSettings};
use crate::config::AppConfig;
use crate::error::ServeError;
use crate::push::CheckScheduler;
use crate::store::{SnapshotStore, SubscriptionStore};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

type LiveCheckService = CheckService<PilotTableFetcher, FcmSender>;

fn build_service(
    config: &AppConfig,
) -> Result<(Arc<LiveCheckService>, Arc<SubscriptionStore>), ServeError> {
    let fetcher = PilotTableFetcher::new(
        config.source.clone(),
        config.table_ids.clone(),
        config.fetch_timeout,
    )?;
    let sender = push::maybe_build_sender(config);
    let subscriptions = Arc::new(SubscriptionStore::open(&config.data_dir));
    let service = Arc::new(CheckService::new(
        fetcher,
        sender,
        SnapshotStore::open(&config.data_dir),
        Arc::clone(&subscriptions),
        CheckSettings::from_config(config),
    ));
    Ok((service, subscriptions))
}

/// Runs the HTTP API and the background scheduler until ctrl-c.
pub async fn serve(config: AppConfig) -> Result<(), ServeError> {
    let (checks, subscriptions) = build_service(&config)?;

    match checks.prune_favorites().await {
        Ok(changed) => info!(subscribers = changed, "startup favorites cleanup finished"),
        Err(err) => warn!(%err, "startup favorites cleanup skipped"),
    }

    let cancel = CancellationToken::new();
    let scheduler = CheckScheduler::new(
        TokioClock,
        Arc::clone(&checks),
        config.check_interval,
    )
    .spawn(cancel.clone());

    let listener = match tokio::net::TcpListener::bind(config.bind).await {
        Ok(listener) => listener,
        Err(source) => {
            scheduler.stop().await?;
            return Err(ServeError::Bind {
                addr: config.bind,
                source,
            });
        }
    };
    info!(addr = %config.bind, "listening");

    let router = app::app(state::AppState {
        checks,
        subscriptions,
    });
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await
        .map_err(ServeError::Serve);

    scheduler.stop().await?;
    info!("shutdown complete");
    served
}

/// Runs a single check cycle, notifying subscribers when delivery is configured.
pub async fn check_once(config: &AppConfig) -> Result<CheckReport, ServeError> {
    let (checks, _) = build_service(config)?;
    Ok(checks.run_cycle().await?)
}

async fn shutdown_signal(cancel: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("shutdown requested"),
            Err(err) => {
                error!(%err, "failed to listen for ctrl-c");
                cancel.cancelled().await;
            }
        },
        _ = cancel.cancelled() => {}
    }
    cancel.cancel();
}
