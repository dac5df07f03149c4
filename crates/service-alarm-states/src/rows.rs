// Row building
//
// One row per service in a view. The name cell is filled from the service
// descriptor; the state cell starts empty and is owned by the reconciler.

use service_states_core::{
    Cell, Keyed, MonitoringClient, Result, Row, RowKey, ServiceDescriptor, ServiceStateError,
    ViewId,
};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// Position of the display-name cell
pub const NAME_CELL: usize = 0;

/// Position of the alarm-state cell
pub const STATE_CELL: usize = 1;

/// Fetch the services of a view and build one row per service
///
/// Rows keep the order the monitoring system returned. Request failures are
/// returned as-is.
pub async fn build_rows(client: &dyn MonitoringClient, view_id: ViewId) -> Result<Vec<Row>> {
    let services = client.list_services_for_view(view_id).await?;
    let rows: Vec<Row> = services.iter().map(service_row).collect();

    debug!(view_id = %view_id, rows = rows.len(), "Built service rows");
    Ok(rows)
}

/// Row for a single service, state cell empty
pub fn service_row(service: &ServiceDescriptor) -> Row {
    Row::new(
        service.row_key(),
        vec![Cell::text(service.name.clone()), Cell::empty()],
    )
}

/// Key-to-position index over a page's rows
///
/// Borrows the keys from the rows it indexes. Building fails on the first
/// duplicate key.
#[derive(Debug)]
pub struct RowIndex<'a> {
    positions: HashMap<&'a RowKey, usize>,
}

impl<'a> RowIndex<'a> {
    pub fn build(rows: &'a [Row]) -> Result<Self> {
        let mut positions = HashMap::with_capacity(rows.len());
        for (position, row) in rows.iter().enumerate() {
            match positions.entry(&row.key) {
                Entry::Occupied(_) => {
                    return Err(ServiceStateError::DuplicateRowKey(row.key.clone()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(position);
                }
            }
        }
        Ok(Self { positions })
    }

    pub fn position(&self, key: &RowKey) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn contains(&self, key: &RowKey) -> bool {
        self.positions.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a RowKey> + '_ {
        self.positions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
