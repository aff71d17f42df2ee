use serde::{Deserialize, Serialize};

/// One row of the published pilot-assignment table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub ship_name: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub remark: String,
}

/// Every record observed by one fetch, in table order.
pub type Snapshot = Vec<ScheduleRecord>;

/// Trimmed, lowercased ship name used for favorite cleanup.
pub fn normalize_ship_name(name: &str) -> String {
    name.trim().to_lowercase()
}
