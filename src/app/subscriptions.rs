//! Registration endpoints used by the mobile client.
//!
//! Bodies are read as raw JSON so that wrong value types get the same
//! `{status: "error"}` envelope as missing fields instead of axum's default
//! rejection.

use crate::app::{ApiError, StatusResponse, api_error};
use crate::error::RequestError;
use crate::ports::{PushSender, ScheduleFetcher};
use crate::state::AppState;
use crate::types::push::token_label;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value as JsonValue};
use tracing::{error, info};

type JsonObject = Map<String, JsonValue>;

pub(crate) async fn register_token(body: Bytes) -> Response {
    let token = match parse_object(&body).and_then(|object| required_token(&object)) {
        Ok(token) => token,
        Err(err) => return err.into_response(),
    };
    info!(token = %token_label(&token), "device token registered");
    StatusResponse::success().into_response()
}

pub(crate) async fn register_favorites<F, S>(
    State(state): State<AppState<F, S>>,
    body: Bytes,
) -> Response
where
    F: ScheduleFetcher,
    S: PushSender,
{
    let (token, favorites) = match parse_favorites_request(&body) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };
    let count = favorites.len();
    if let Err(err) = state.subscriptions.set_favorites(&token, favorites) {
        error!(%err, "failed to save favorites");
        return store_failure().into_response();
    }
    info!(token = %token_label(&token), favorites = count, "favorites saved");
    StatusResponse::success().into_response()
}

pub(crate) async fn set_alarm_mode<F, S>(
    State(state): State<AppState<F, S>>,
    body: Bytes,
) -> Response
where
    F: ScheduleFetcher,
    S: PushSender,
{
    let (token, alarm_mode) = match parse_alarm_mode_request(&body) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };
    if let Err(err) = state.subscriptions.set_alarm_mode(&token, alarm_mode) {
        error!(%err, "failed to save alarm mode");
        return store_failure().into_response();
    }
    info!(token = %token_label(&token), alarm_mode, "alarm mode saved");
    StatusResponse::success().into_response()
}

fn store_failure() -> ApiError {
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "failed to save subscription",
    )
}

fn parse_object(body: &[u8]) -> Result<JsonObject, RequestError> {
    match serde_json::from_slice::<JsonValue>(body) {
        Ok(JsonValue::Object(object)) => Ok(object),
        Ok(_) => Err(RequestError::MalformedBody(
            "expected a JSON object".to_string(),
        )),
        Err(err) => Err(RequestError::MalformedBody(err.to_string())),
    }
}

fn required_token(object: &JsonObject) -> Result<String, RequestError> {
    match object.get("token") {
        Some(JsonValue::String(token)) if !token.trim().is_empty() => Ok(token.clone()),
        _ => Err(RequestError::MissingToken),
    }
}

/// A missing `favorites` key clears the list.
fn parse_favorites_request(body: &[u8]) -> Result<(String, Vec<String>), RequestError> {
    let object = parse_object(body)?;
    let token = required_token(&object)?;
    let favorites = match object.get("favorites") {
        None => Vec::new(),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| match item {
                JsonValue::String(name) => Ok(name.clone()),
                _ => Err(RequestError::InvalidFavorites),
            })
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(RequestError::InvalidFavorites),
    };
    Ok((token, favorites))
}

fn parse_alarm_mode_request(body: &[u8]) -> Result<(String, bool), RequestError> {
    let object = parse_object(body)?;
    let token = required_token(&object)?;
    match object.get("alarm_mode") {
        Some(JsonValue::Bool(alarm_mode)) => Ok((token, *alarm_mode)),
        _ => Err(RequestError::InvalidAlarmMode),
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::app::tests::{post_json, send, test_state};
    use crate::store::{ALARM_MODES_FILE, FAVORITES_FILE, SubscriptionStore};
    use crate::testing::{RecordingSender, ScriptedFetcher, create_temp_root};

    #[test]
    fn parse_favorites_request__should_accept_list_of_names() {
        // When
        let request = parse_favorites_request(br#"{"token":"t1","favorites":["ALPHA","BETA"]}"#);

        // Then
        assert_eq!(
            request,
            Ok((
                "t1".to_string(),
                vec!["ALPHA".to_string(), "BETA".to_string()]
            ))
        );
    }

    #[test]
    fn parse_favorites_request__should_default_missing_favorites_to_empty() {
        assert_eq!(
            parse_favorites_request(br#"{"token":"t1"}"#),
            Ok(("t1".to_string(), Vec::new()))
        );
    }

    #[test]
    fn parse_favorites_request__should_reject_non_list_favorites() {
        assert_eq!(
            parse_favorites_request(br#"{"token":"t1","favorites":"ALPHA"}"#),
            Err(RequestError::InvalidFavorites)
        );
        assert_eq!(
            parse_favorites_request(br#"{"token":"t1","favorites":["ALPHA",3]}"#),
            Err(RequestError::InvalidFavorites)
        );
    }

    #[test]
    fn parse_favorites_request__should_require_token() {
        assert_eq!(
            parse_favorites_request(br#"{"favorites":[]}"#),
            Err(RequestError::MissingToken)
        );
        assert_eq!(
            parse_favorites_request(br#"{"token":"","favorites":[]}"#),
            Err(RequestError::MissingToken)
        );
    }

    #[test]
    fn parse_alarm_mode_request__should_require_boolean() {
        assert_eq!(
            parse_alarm_mode_request(br#"{"token":"t1","alarm_mode":true}"#),
            Ok(("t1".to_string(), true))
        );
        assert_eq!(
            parse_alarm_mode_request(br#"{"token":"t1","alarm_mode":"on"}"#),
            Err(RequestError::InvalidAlarmMode)
        );
        assert_eq!(
            parse_alarm_mode_request(br#"{"token":"t1"}"#),
            Err(RequestError::InvalidAlarmMode)
        );
    }

    #[test]
    fn parse_object__should_reject_malformed_json() {
        assert!(matches!(
            parse_object(b"{not json"),
            Err(RequestError::MalformedBody(_))
        ));
        assert!(matches!(
            parse_object(b"[1, 2]"),
            Err(RequestError::MalformedBody(_))
        ));
    }

    #[tokio::test]
    async fn register_favorites__should_persist_list() {
        // Given
        let root = create_temp_root("api-favorites");
        let state = test_state(&root, ScriptedFetcher::default(), RecordingSender::default());

        // When
        let (status, json) = send(
            state.clone(),
            post_json(
                "/api/register_favorites",
                r#"{"token":"token-a","favorites":["BLUE KINGDOM"]}"#,
            ),
        )
        .await;

        // Then
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert!(root.join(FAVORITES_FILE).exists());
        let reopened = SubscriptionStore::open(&root);
        assert_eq!(
            reopened.favorites("token-a"),
            Some(vec!["BLUE KINGDOM".to_string()])
        );

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn register_favorites__should_reject_invalid_payload_without_writing() {
        // Given
        let root = create_temp_root("api-favorites-invalid");
        let state = test_state(&root, ScriptedFetcher::default(), RecordingSender::default());

        // When
        let (status, json) = send(
            state,
            post_json(
                "/api/register_favorites",
                r#"{"token":"token-a","favorites":{"name":"ALPHA"}}"#,
            ),
        )
        .await;

        // Then
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
        assert!(!root.join(FAVORITES_FILE).exists());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn set_alarm_mode__should_persist_flag() {
        // Given
        let root = create_temp_root("api-alarm-mode");
        let state = test_state(&root, ScriptedFetcher::default(), RecordingSender::default());

        // When
        let (status, _) = send(
            state.clone(),
            post_json("/api/alarm_mode", r#"{"token":"token-a","alarm_mode":true}"#),
        )
        .await;

        // Then
        assert_eq!(status, StatusCode::OK);
        assert!(root.join(ALARM_MODES_FILE).exists());
        assert_eq!(state.subscriptions.alarm_mode("token-a"), Some(true));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn set_alarm_mode__should_reject_non_boolean() {
        // Given
        let root = create_temp_root("api-alarm-mode-invalid");
        let state = test_state(&root, ScriptedFetcher::default(), RecordingSender::default());

        // When
        let (status, json) = send(
            state.clone(),
            post_json("/api/alarm_mode", r#"{"token":"token-a","alarm_mode":1}"#),
        )
        .await;

        // Then
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "alarm_mode must be a boolean");
        assert_eq!(state.subscriptions.alarm_mode("token-a"), None);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn register_token__should_require_token() {
        // Given
        let root = create_temp_root("api-register-token");
        let state = test_state(&root, ScriptedFetcher::default(), RecordingSender::default());

        // When
        let (ok_status, _) = send(
            state.clone(),
            post_json("/api/register_token", r#"{"token":"token-a"}"#),
        )
        .await;
        let (missing_status, json) =
            send(state, post_json("/api/register_token", r#"{}"#)).await;

        // Then
        assert_eq!(ok_status, StatusCode::OK);
        assert_eq!(missing_status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "missing token");

        std::fs::remove_dir_all(&root).expect("cleanup");
    }
}
