//! Error types shared across the check pipeline, the stores and the HTTP surface.

/// Failure to obtain a schedule snapshot from upstream.
///
/// Always distinct from an empty snapshot, which means no ships are scheduled.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("schedule source responded with HTTP {0}")]
    Status(u16),

    #[error("schedule fetch timed out")]
    Timeout,

    #[error("failed to read schedule source: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Failure to persist one of the JSON stores.
///
/// Unreadable or corrupt documents never produce this error; they load as
/// empty defaults instead.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of a failed push delivery.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The transport no longer resolves the token to a live device.
    #[error("delivery token is no longer valid")]
    InvalidToken,

    #[error("delivery failed: {0}")]
    Transient(String),
}

/// A check cycle that did not complete.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Malformed registration payload.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("malformed JSON body: {0}")]
    MalformedBody(String),

    #[error("missing token")]
    MissingToken,

    #[error("favorites must be a list of ship names")]
    InvalidFavorites,

    #[error("alarm_mode must be a boolean")]
    InvalidAlarmMode,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("{0}")]
    Invalid(String),

    #[error("invalid FCM credentials: {0}")]
    Credentials(String),
}

/// Fatal startup or serving failure.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error("scheduler task failed: {0}")]
    Scheduler(#[from] tokio::task::JoinError),
}
