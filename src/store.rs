//! Flat JSON documents under the data directory.
//!
//! Each store owns one or two files. Reads never fail: a missing, empty or
//! unparseable file loads as the type's default and the corruption is logged.
//! Writes go through a temp file and a rename so a crash mid-write leaves the
//! previous document intact.

use crate::error::StoreError;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

mod snapshot;
mod subscriptions;

pub use snapshot::SnapshotStore;
pub use subscriptions::{PrunedFavorites, Subscriber, SubscriptionStore};

pub(crate) const SNAPSHOT_FILE: &str = "previous_data.json";
pub(crate) const FAVORITES_FILE: &str = "favorites.json";
pub(crate) const ALARM_MODES_FILE: &str = "alarm_modes.json";

pub(crate) fn load_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return T::default(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read store, using empty default");
            return T::default();
        }
    };

    if contents.trim().is_empty() {
        return T::default();
    }

    match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "corrupt store, using empty default");
            T::default()
        }
    }
}

pub(crate) fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize {
        path: path.display().to_string(),
        source,
    })?;
    let io_error = |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    atomic_write_bytes(path, &bytes).map_err(io_error)
}

fn atomic_write_bytes(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("missing parent directory"))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("store.json");
    let pid = std::process::id();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    for attempt in 0..10u32 {
        let temp_name = format!(".{}.tmp-{}-{}-{}", file_name, pid, nanos, attempt);
        let temp_path = parent.join(temp_name);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(mut file) => {
                use std::io::Write as _;
                file.write_all(contents)?;
                file.flush()?;
                std::fs::rename(&temp_path, path)?;
                return Ok(());
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to allocate temp file",
    ))
}
