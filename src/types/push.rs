use crate::error::ConfigError;

use serde::Deserialize;

/// Delivery profile picked from a subscriber's alarm-mode flag.
///
/// The profile changes how a notification is presented on the device, never
/// which alerts are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertProfile {
    Alarm,
    Gentle,
}

impl AlertProfile {
    pub fn from_alarm_mode(alarm_mode: bool) -> Self {
        if alarm_mode { Self::Alarm } else { Self::Gentle }
    }

    pub fn sound(self) -> &'static str {
        match self {
            Self::Alarm => "boat_horn",
            Self::Gentle => "soft_bell",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Self::Alarm => "on",
            Self::Gentle => "off",
        }
    }
}

/// Google service account used to mint FCM access tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccount {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|err| ConfigError::Credentials(err.to_string()))
    }
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Short form of a delivery token for log lines.
pub fn token_label(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    if prefix.len() < token.len() {
        format!("{prefix}…")
    } else {
        prefix
    }
}
