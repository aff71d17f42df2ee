//! Firebase Cloud Messaging (HTTP v1) delivery.
//!
//! Requests are authorized with an OAuth access token obtained by signing a
//! JWT-bearer assertion with the service account key. The token is cached
//! until shortly before it expires.

use crate::error::{ConfigError, DeliveryError};
use crate::ports;
use crate::types::push::{AlertProfile, ServiceAccount};

use jwt_simple::prelude::{Claims, Duration as JwtDuration, RS256KeyPair, RSAKeyPairLike};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::debug;

const FCM_API_BASE: &str = "https://fcm.googleapis.com";
const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_TTL_SECS: u64 = 3600;
const MAX_TOKEN_LIFETIME_SECS: i64 = 86_400;
const TOKEN_REFRESH_MARGIN: time::Duration = time::Duration::seconds(60);
const ALERT_TITLE: &str = "Pilot schedule update";

#[derive(Clone)]
pub struct FcmSender {
    inner: Arc<FcmInner>,
}

struct FcmInner {
    client: reqwest::Client,
    account: ServiceAccount,
    key_pair: RS256KeyPair,
    api_base: String,
    access_token: tokio::sync::Mutex<Option<AccessToken>>,
}

#[derive(Clone)]
struct AccessToken {
    value: String,
    expires_at: OffsetDateTime,
}

#[derive(Serialize, Deserialize)]
struct ScopeClaims {
    scope: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_TTL_SECS as i64
}

impl FcmSender {
    /// `timeout` bounds every request, token exchange included.
    pub fn new(account: ServiceAccount, timeout: Duration) -> Result<Self, ConfigError> {
        Self::new_with_base(account, FCM_API_BASE.to_string(), timeout)
    }

    fn new_with_base(
        account: ServiceAccount,
        api_base: String,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let key_pair = RS256KeyPair::from_pem(&account.private_key)
            .map_err(|err| ConfigError::Credentials(format!("invalid private key: {err}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| {
                ConfigError::Credentials(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self {
            inner: Arc::new(FcmInner {
                client,
                account,
                key_pair,
                api_base,
                access_token: tokio::sync::Mutex::new(None),
            }),
        })
    }

    async fn access_token(&self) -> Result<String, DeliveryError> {
        let mut cached = self.inner.access_token.lock().await;
        let now = OffsetDateTime::now_utc();
        if let Some(token) = cached
            .as_ref()
            .filter(|token| token.expires_at - TOKEN_REFRESH_MARGIN > now)
        {
            return Ok(token.value.clone());
        }

        let token = self.request_access_token(now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn request_access_token(
        &self,
        now: OffsetDateTime,
    ) -> Result<AccessToken, DeliveryError> {
        let account = &self.inner.account;
        let claims = Claims::with_custom_claims(
            ScopeClaims {
                scope: FCM_SCOPE.to_string(),
            },
            JwtDuration::from_secs(ASSERTION_TTL_SECS),
        )
        .with_issuer(&account.client_email)
        .with_audience(&account.token_uri);
        let assertion = self
            .inner
            .key_pair
            .sign(claims)
            .map_err(|err| DeliveryError::Transient(format!("failed to sign assertion: {err}")))?;

        let response = self
            .inner
            .client
            .post(&account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|err| request_error("token request", err))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Transient(format!(
                "token endpoint returned {status}: {body}"
            )));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| request_error("token response", err))?;
        debug!(expires_in = token.expires_in, "fetched FCM access token");

        let lifetime = token.expires_in.clamp(0, MAX_TOKEN_LIFETIME_SECS);
        Ok(AccessToken {
            value: token.access_token,
            expires_at: now + time::Duration::seconds(lifetime),
        })
    }

    fn message_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.inner.api_base.trim_end_matches('/'),
            self.inner.account.project_id
        )
    }
}

impl ports::PushSender for FcmSender {
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>>
    where
        Self: 'a;

    fn send<'a>(
        &'a self,
        token: &'a str,
        lines: &'a [String],
        alarm_mode: bool,
    ) -> Self::Fut<'a> {
        Box::pin(async move {
            let access_token = self.access_token().await?;
            let profile = AlertProfile::from_alarm_mode(alarm_mode);
            let payload = json!({
                "message": {
                    "token": token,
                    "data": {
                        "title": ALERT_TITLE,
                        "body": lines.join("\n"),
                        "alarm_mode": profile.flag(),
                        "sound": profile.sound(),
                    },
                    "android": { "priority": "high" },
                }
            });

            let response = self
                .inner
                .client
                .post(self.message_url())
                .bearer_auth(access_token)
                .json(&payload)
                .send()
                .await
                .map_err(|err| request_error("message send", err))?;
            let status = response.status();
            if status.is_success() {
                return Ok(());
            }
            let body = response.text().await.unwrap_or_default();
            Err(classify_failure(status, &body))
        })
    }
}

fn request_error(stage: &str, err: reqwest::Error) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::Transient(format!("{stage} timed out"))
    } else {
        DeliveryError::Transient(format!("{stage} failed: {err}"))
    }
}

/// Maps a rejected send to a delivery error. Only an FCM error body saying
/// the registration token is unknown means the token is dead; a bare 404
/// from a wrong project or base URL is transient.
fn classify_failure(status: StatusCode, body: &str) -> DeliveryError {
    if body.contains("UNREGISTERED") || body.contains("Requested entity was not found") {
        DeliveryError::InvalidToken
    } else {
        DeliveryError::Transient(format!("FCM returned {status}: {body}"))
    }
}
