use crate::error::StoreError;
use crate::store::{ALARM_MODES_FILE, FAVORITES_FILE, load_json, save_json};

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

type Favorites = BTreeMap<String, Vec<String>>;
type AlarmModes = BTreeMap<String, bool>;

#[derive(Debug, Default)]
struct Subscriptions {
    favorites: Favorites,
    alarm_modes: AlarmModes,
}

/// One subscriber as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscriber {
    pub token: String,
    pub favorites: Vec<String>,
    pub alarm_mode: bool,
}

/// A favorite list that lost entries during cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrunedFavorites {
    pub token: String,
    pub before: usize,
    pub after: usize,
}

/// Per-token favorites and alarm-mode flags, persisted as two JSON maps.
///
/// Every mutation holds the lock for the whole read-modify-write and only
/// commits the in-memory state once the file write succeeded.
#[derive(Debug)]
pub struct SubscriptionStore {
    favorites_path: PathBuf,
    alarm_modes_path: PathBuf,
    state: Mutex<Subscriptions>,
}

impl SubscriptionStore {
    pub fn open(data_dir: &Path) -> Self {
        let favorites_path = data_dir.join(FAVORITES_FILE);
        let alarm_modes_path = data_dir.join(ALARM_MODES_FILE);
        let state = Subscriptions {
            favorites: load_json(&favorites_path),
            alarm_modes: load_json(&alarm_modes_path),
        };
        Self {
            favorites_path,
            alarm_modes_path,
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Subscriptions> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_favorites(&self, token: &str, favorites: Vec<String>) -> Result<(), StoreError> {
        let mut state = self.lock();
        let mut updated = state.favorites.clone();
        updated.insert(token.to_string(), favorites);
        save_json(&self.favorites_path, &updated)?;
        state.favorites = updated;
        Ok(())
    }

    pub fn set_alarm_mode(&self, token: &str, alarm_mode: bool) -> Result<(), StoreError> {
        let mut state = self.lock();
        let mut updated = state.alarm_modes.clone();
        updated.insert(token.to_string(), alarm_mode);
        save_json(&self.alarm_modes_path, &updated)?;
        state.alarm_modes = updated;
        Ok(())
    }

    pub fn favorites(&self, token: &str) -> Option<Vec<String>> {
        self.lock().favorites.get(token).cloned()
    }

    pub fn alarm_mode(&self, token: &str) -> Option<bool> {
        self.lock().alarm_modes.get(token).copied()
    }

    /// Subscribers with a favorites entry, in token order.
    pub fn subscribers(&self) -> Vec<Subscriber> {
        let state = self.lock();
        state
            .favorites
            .iter()
            .map(|(token, favorites)| Subscriber {
                token: token.clone(),
                favorites: favorites.clone(),
                alarm_mode: state.alarm_modes.get(token).copied().unwrap_or(false),
            })
            .collect()
    }

    /// Drops the token from both maps. Returns whether anything was removed.
    pub fn remove_token(&self, token: &str) -> Result<bool, StoreError> {
        let mut state = self.lock();
        let mut removed = false;

        if state.favorites.contains_key(token) {
            let mut updated = state.favorites.clone();
            updated.remove(token);
            save_json(&self.favorites_path, &updated)?;
            state.favorites = updated;
            removed = true;
        }

        if state.alarm_modes.contains_key(token) {
            let mut updated = state.alarm_modes.clone();
            updated.remove(token);
            save_json(&self.alarm_modes_path, &updated)?;
            state.alarm_modes = updated;
            removed = true;
        }

        Ok(removed)
    }

    /// Keeps only the favorites accepted by `keep`. The favorites file is
    /// rewritten only when at least one list got shorter.
    pub fn retain_favorites<P>(&self, keep: P) -> Result<Vec<PrunedFavorites>, StoreError>
    where
        P: Fn(&str) -> bool,
    {
        let mut state = self.lock();
        let mut updated = state.favorites.clone();
        let mut pruned = Vec::new();

        for (token, names) in updated.iter_mut() {
            let before = names.len();
            names.retain(|name| keep(name.as_str()));
            if names.len() != before {
                pruned.push(PrunedFavorites {
                    token: token.clone(),
                    before,
                    after: names.len(),
                });
            }
        }

        if !pruned.is_empty() {
            save_json(&self.favorites_path, &updated)?;
            state.favorites = updated;
        }
        Ok(pruned)
    }
}
