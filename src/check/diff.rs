use crate::types::changes::{ChangeSet, RemovedShip, StatusChange, TimeChange};
use crate::types::schedule::ScheduleRecord;

use std::collections::{HashMap, HashSet};

/// Compares two snapshots by record id.
///
/// Records only present in `current` are ignored. For ids present in both,
/// `time` is compared verbatim and each recognized keyword is checked
/// independently against `status`. Output follows `current` order, then the
/// removals in `previous` order. When an id repeats inside one snapshot the
/// last occurrence wins.
pub fn compute_changes(
    previous: &[ScheduleRecord],
    current: &[ScheduleRecord],
    keywords: &[String],
) -> ChangeSet {
    let previous_by_id = index_by_id(previous);
    let current_by_id = index_by_id(current);
    let mut changes = ChangeSet::default();

    let mut seen = HashSet::new();
    for record in current {
        if !seen.insert(record.id.as_str()) {
            continue;
        }
        let Some(old) = previous_by_id.get(record.id.as_str()) else {
            continue;
        };
        let new = current_by_id[record.id.as_str()];

        if old.time != new.time {
            changes.time_changes.push(TimeChange {
                id: new.id.clone(),
                ship_name: new.ship_name.clone(),
                before: old.time.clone(),
                after: new.time.clone(),
            });
        }

        for keyword in keywords {
            let was = old.status.contains(keyword.as_str());
            let is = new.status.contains(keyword.as_str());
            match (was, is) {
                (false, true) => changes.status_added.push(status_change(new, keyword)),
                (true, false) => changes.status_removed.push(status_change(new, keyword)),
                _ => {}
            }
        }
    }

    let mut seen = HashSet::new();
    for record in previous {
        if !seen.insert(record.id.as_str()) || current_by_id.contains_key(record.id.as_str()) {
            continue;
        }
        let old = previous_by_id[record.id.as_str()];
        changes.removed_ships.push(RemovedShip {
            id: old.id.clone(),
            ship_name: old.ship_name.clone(),
            time: old.time.clone(),
            status: old.status.clone(),
        });
    }

    changes
}

fn status_change(record: &ScheduleRecord, keyword: &str) -> StatusChange {
    StatusChange {
        id: record.id.clone(),
        ship_name: record.ship_name.clone(),
        status: keyword.to_string(),
    }
}

fn index_by_id(snapshot: &[ScheduleRecord]) -> HashMap<&str, &ScheduleRecord> {
    snapshot
        .iter()
        .map(|record| (record.id.as_str(), record))
        .collect()
}
