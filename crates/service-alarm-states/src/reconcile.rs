// One-shot state reconciliation
//
// Joins a snapshot of current service alarm states onto the rows of a page.

use service_states_core::{AlarmStateScope, Cell, Keyed, MonitoringClient, Result, Row};
use tracing::debug;

use crate::rows::{RowIndex, STATE_CELL};

/// Fill the state cell of every row that has a current alarm state
///
/// The row index is built before the request is sent, so duplicate keys fail
/// without touching the monitoring system. States for unknown keys are
/// ignored. Applying the same snapshot twice leaves the rows unchanged.
pub async fn apply_current_states(client: &dyn MonitoringClient, rows: &mut [Row]) -> Result<()> {
    let (received, assignments) = {
        let index = RowIndex::build(rows)?;
        let states = client
            .list_current_alarm_states(AlarmStateScope::SERVICES_ONLY)
            .await?;

        let assignments: Vec<(usize, String)> = states
            .iter()
            .filter_map(|state| {
                index
                    .position(&state.row_key())
                    .map(|position| (position, state.level.to_string()))
            })
            .collect();
        (states.len(), assignments)
    };

    let matched = assignments.len();
    for (position, level) in assignments {
        if let Some(cell) = rows[position].cell_mut(STATE_CELL) {
            *cell = Cell::text(level);
        }
    }

    debug!(states = received, matched, "Applied current alarm states");
    Ok(())
}
