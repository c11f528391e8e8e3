use box_dash_core::{Event, StatsReport};

/// Folds one world event into the scoring report.
///
/// Distance only ever ratchets upward: the player may retreat or respawn
/// on a lower row, but the best distance of the run is what counts.
/// Returns `true` when a counter actually changed so the caller can defer
/// publication until something is worth reporting.
pub(crate) fn fold(report: &mut StatsReport, event: &Event) -> bool {
    match event {
        Event::PlayerAdvanced { location, kind } => {
            let mut changed = false;
            if location.row() > report.max_distance {
                report.max_distance = location.row();
                changed = true;
            }
            if kind.is_hazard() {
                report.hazard_contacts += 1;
                changed = true;
            }
            changed
        }
        Event::RowCollapsed { .. } => {
            report.rows_collapsed += 1;
            true
        }
        Event::TrackRecycled { .. } => {
            report.tracks_recycled += 1;
            true
        }
        _ => false,
    }
}
