use crate::error::RequestError;
use crate::ports::{PushSender, ScheduleFetcher};
use crate::state::AppState;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Serialize;

mod checks;
mod subscriptions;

pub fn app<F, S>(state: AppState<F, S>) -> Router
where
    F: ScheduleFetcher,
    S: PushSender,
{
    Router::new()
        .route("/api/pilotships", get(checks::pilot_ships::<F, S>))
        .route("/api/checkupdates", get(checks::check_updates::<F, S>))
        .route("/api/test-alert", post(checks::test_alert::<F, S>))
        .route(
            "/api/register_token",
            post(subscriptions::register_token),
        )
        .route(
            "/api/register_favorites",
            post(subscriptions::register_favorites::<F, S>),
        )
        .route("/api/alarm_mode", post(subscriptions::set_alarm_mode::<F, S>))
        .route("/health", get(health))
        .with_state(state)
}

pub(crate) async fn health() -> &'static str {
    "ok"
}

#[derive(Serialize)]
pub(crate) struct StatusResponse {
    pub(crate) status: &'static str,
}

impl StatusResponse {
    pub(crate) fn success() -> Json<Self> {
        Json(Self { status: "success" })
    }
}

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) status: &'static str,
    pub(crate) message: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(code: StatusCode, message: impl Into<String>) -> ApiError {
    (
        code,
        Json(ErrorResponse {
            status: "error",
            message: message.into(),
        }),
    )
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        api_error(StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
pub(crate) mod tests {
    use super::*;
    use crate::check::CheckService;
    use crate::store::{SnapshotStore, SubscriptionStore};
    use crate::testing::{RecordingSender, ScriptedFetcher, create_temp_root, settings};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value as JsonValue;
    use std::path::Path;
    use std::sync::Arc;
    use tower::ServiceExt;

    pub(crate) fn test_state(
        root: &Path,
        fetcher: ScriptedFetcher,
        sender: RecordingSender,
    ) -> AppState<ScriptedFetcher, RecordingSender> {
        let subscriptions = Arc::new(SubscriptionStore::open(root));
        let checks = Arc::new(CheckService::new(
            fetcher,
            Some(sender),
            SnapshotStore::open(root),
            Arc::clone(&subscriptions),
            settings(),
        ));
        AppState {
            checks,
            subscriptions,
        }
    }

    pub(crate) async fn send(
        state: AppState<ScriptedFetcher, RecordingSender>,
        request: Request<Body>,
    ) -> (StatusCode, JsonValue) {
        let response = app(state).oneshot(request).await.expect("request failed");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = serde_json::from_slice(&body).unwrap_or(JsonValue::Null);
        (status, json)
    }

    pub(crate) fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn app__should_return_ok_on_health_endpoint() {
        // Given
        let root = create_temp_root("health");
        let state = test_state(&root, ScriptedFetcher::default(), RecordingSender::default());

        // When
        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("request failed");

        // Then
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        assert_eq!(body.as_ref(), b"ok");

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn request_error__should_render_error_envelope() {
        // When
        let response = RequestError::MissingToken.into_response();

        // Then
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json: JsonValue = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "missing token");
    }
}
