// Service Alarm States Data Source
//
// Exposes the services of a monitoring view, with their current alarm level,
// to a host query engine as a single page of rows. When the host asks for
// updates, the alarm level column is kept current from state-change events.
//
// Key design decisions:
// - Rows are built first; reconciliation runs in exactly one of two modes
// - The monitoring client is injected at init, never global
// - The live subscription owns a key filter and a handler, tested separately
// - Teardown closes an update gate before releasing the subscription

pub mod config;
pub mod reconcile;
pub mod rows;
pub mod source;
pub mod subscription;

// Re-exports for convenience
pub use config::SourceConfig;
pub use reconcile::apply_current_states;
pub use rows::{build_rows, service_row, RowIndex, NAME_CELL, STATE_CELL};
pub use source::ServiceAlarmStates;
pub use subscription::{RowKeyFilter, StateChangeHandler, StateSubscription};
