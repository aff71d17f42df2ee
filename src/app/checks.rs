use crate::app::{ApiError, api_error};
use crate::ports::{PushSender, ScheduleFetcher};
use crate::state::AppState;
use crate::types::changes::ChangeSet;
use crate::types::schedule::Snapshot;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use tracing::{error, info};

#[derive(Serialize)]
pub(crate) struct PilotShipsResponse {
    pub(crate) status: &'static str,
    pub(crate) data: Snapshot,
}

#[derive(Serialize)]
pub(crate) struct CheckUpdatesResponse {
    pub(crate) status: &'static str,
    pub(crate) changes: ChangeSet,
    pub(crate) alerts: Vec<String>,
}

#[derive(Serialize)]
pub(crate) struct TestAlertResponse {
    pub(crate) status: &'static str,
    pub(crate) alerts: Vec<String>,
}

pub(crate) async fn pilot_ships<F, S>(
    State(state): State<AppState<F, S>>,
) -> Result<Json<PilotShipsResponse>, ApiError>
where
    F: ScheduleFetcher,
    S: PushSender,
{
    match state.checks.current_schedule().await {
        Ok(data) => Ok(Json(PilotShipsResponse {
            status: "success",
            data,
        })),
        Err(err) => {
            error!(%err, "failed to fetch pilot schedule");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

/// Runs a full cycle on demand, the same as a scheduled one.
pub(crate) async fn check_updates<F, S>(
    State(state): State<AppState<F, S>>,
) -> Result<Json<CheckUpdatesResponse>, ApiError>
where
    F: ScheduleFetcher,
    S: PushSender,
{
    match state.checks.run_cycle().await {
        Ok(report) => Ok(Json(CheckUpdatesResponse {
            status: "success",
            changes: report.changes,
            alerts: report.alerts,
        })),
        Err(err) => {
            error!(%err, "on-demand check failed");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

pub(crate) async fn test_alert<F, S>(State(state): State<AppState<F, S>>) -> Json<TestAlertResponse>
where
    F: ScheduleFetcher,
    S: PushSender,
{
    let alerts = state.checks.send_test_alert().await;
    info!(alerts = alerts.len(), "test alert dispatched");
    Json(TestAlertResponse {
        status: "success",
        alerts,
    })
}
