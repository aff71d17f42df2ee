use serde::{Deserialize, Serialize};

/// A recognized restriction keyword appearing in or leaving a record's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: String,
    pub ship_name: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeChange {
    pub id: String,
    pub ship_name: String,
    pub before: String,
    pub after: String,
}

/// A record present in the previous snapshot but missing from the current one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedShip {
    pub id: String,
    pub ship_name: String,
    pub time: String,
    pub status: String,
}

/// Structured diff between two snapshots, partitioned by change kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub status_added: Vec<StatusChange>,
    pub status_removed: Vec<StatusChange>,
    pub time_changes: Vec<TimeChange>,
    pub removed_ships: Vec<RemovedShip>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.status_added.len()
            + self.status_removed.len()
            + self.time_changes.len()
            + self.removed_ships.len()
    }
}
