use crate::error::StoreError;
use crate::store::{SNAPSHOT_FILE, load_json, save_json};
use crate::types::schedule::{ScheduleRecord, Snapshot};

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Holds the snapshot observed by the last completed check.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    write: Mutex<()>,
}

impl SnapshotStore {
    pub fn open(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SNAPSHOT_FILE),
            write: Mutex::new(()),
        }
    }

    pub fn load(&self) -> Snapshot {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        load_json(&self.path)
    }

    pub fn save(&self, snapshot: &[ScheduleRecord]) -> Result<(), StoreError> {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        save_json(&self.path, &snapshot)
    }
}
