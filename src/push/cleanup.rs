use crate::error::StoreError;
use crate::store::SubscriptionStore;
use crate::types::push::token_label;
use crate::types::schedule::{ScheduleRecord, normalize_ship_name};

use std::collections::HashSet;
use tracing::info;

/// Drops favorites naming ships absent from `latest`.
///
/// Names are compared trimmed and case-folded. Returns how many subscribers
/// lost at least one favorite; the store is only written when that is
/// non-zero.
pub fn prune(
    latest: &[ScheduleRecord],
    subscriptions: &SubscriptionStore,
) -> Result<usize, StoreError> {
    let listed: HashSet<String> = latest
        .iter()
        .map(|record| normalize_ship_name(&record.ship_name))
        .filter(|name| !name.is_empty())
        .collect();

    let pruned =
        subscriptions.retain_favorites(|name| listed.contains(&normalize_ship_name(name)))?;
    for entry in &pruned {
        info!(
            token = %token_label(&entry.token),
            before = entry.before,
            after = entry.after,
            "pruned favorites no longer on the schedule"
        );
    }
    Ok(pruned.len())
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::store::FAVORITES_FILE;
    use crate::testing::{create_temp_root, record};

    #[test]
    fn prune__should_keep_only_listed_ships() {
        // Given
        let root = create_temp_root("prune-listed");
        let store = SubscriptionStore::open(&root);
        store
            .set_favorites("token-a", vec!["alpha".to_string(), "GAMMA".to_string()])
            .expect("set favorites");
        let latest = vec![
            record("1", "", "10:00", "ALPHA"),
            record("2", "", "11:00", "BETA"),
        ];

        // When
        let changed = prune(&latest, &store).expect("prune");

        // Then
        assert_eq!(changed, 1);
        assert_eq!(store.favorites("token-a"), Some(vec!["alpha".to_string()]));
        let reopened = SubscriptionStore::open(&root);
        assert_eq!(reopened.favorites("token-a"), Some(vec!["alpha".to_string()]));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn prune__should_ignore_surrounding_whitespace() {
        // Given
        let root = create_temp_root("prune-whitespace");
        let store = SubscriptionStore::open(&root);
        store
            .set_favorites("token-a", vec!["  Beta ".to_string()])
            .expect("set favorites");
        let latest = vec![record("2", "", "11:00", " BETA")];

        // When
        let changed = prune(&latest, &store).expect("prune");

        // Then
        assert_eq!(changed, 0);
        assert_eq!(store.favorites("token-a"), Some(vec!["  Beta ".to_string()]));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn prune__should_not_rewrite_store_when_unchanged() {
        // Given
        let root = create_temp_root("prune-unchanged");
        let store = SubscriptionStore::open(&root);
        store
            .set_favorites("token-a", vec!["ALPHA".to_string()])
            .expect("set favorites");
        let path = root.join(FAVORITES_FILE);
        std::fs::write(&path, "{}").expect("overwrite favorites on disk");
        let latest = vec![record("1", "", "10:00", "alpha")];

        // When
        let changed = prune(&latest, &store).expect("prune");

        // Then
        assert_eq!(changed, 0);
        assert_eq!(std::fs::read_to_string(&path).expect("read favorites"), "{}");

        std::fs::remove_dir_all(&root).expect("cleanup");
    }
}
