use crate::types::changes::ChangeSet;

/// One line per change, in the order: restrictions added, restrictions
/// lifted, time changes, removed ships.
///
/// Ship names are quoted (`'NAME'`) so subscribers can be matched against
/// the rendered text.
pub fn render(changes: &ChangeSet) -> Vec<String> {
    let mut alerts = Vec::with_capacity(changes.len());

    for added in &changes.status_added {
        alerts.push(format!(
            "⚠️ [Pilotage restricted] '{}' is restricted from pilotage due to '{}'.",
            added.ship_name, added.status
        ));
    }

    for lifted in &changes.status_removed {
        alerts.push(format!(
            "✅ [Pilotage resumed] '{}' is cleared of '{}'; pilotage resumes.",
            lifted.ship_name, lifted.status
        ));
    }

    for change in &changes.time_changes {
        alerts.push(format!(
            "⏰ [Time changed] '{}' pilotage time changed {} ➝ {}.",
            change.ship_name, change.before, change.after
        ));
    }

    for removed in &changes.removed_ships {
        alerts.push(format!(
            "🚢 [Delisted] '{}' was removed from the pilotage schedule.",
            removed.ship_name
        ));
    }

    alerts
}
