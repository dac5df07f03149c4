// Service State Abstractions
//
// This crate provides the types and contracts a service alarm state data
// source is built on, independent of any particular monitoring connection or
// host query engine.
//
// Key design decisions:
// - Uses traits (MonitoringClient, RowUpdateSink, DataSource) for pluggable backends
// - Row keys are derived by one function (Keyed::row_key) for every record kind
// - Alarm levels keep their numeric code and render to text only in cells
// - Subscriptions hand back an event stream; releasing the handle ends it

pub mod alarm;
pub mod entities;
pub mod error;
pub mod host;
pub mod traits;

// In-memory implementations for examples and testing
pub mod memory;

// Re-exports for convenience
pub use alarm::AlarmLevel;
pub use entities::{
    AlarmStateChangeEvent, AlarmStateRecord, Keyed, RowKey, ServiceDescriptor, ViewId,
};
pub use error::{Result, ServiceStateError};
pub use host::{
    ArgumentSpec, ArgumentType, ArgumentValue, ArgumentValues, Cell, ColumnSpec, ColumnType,
    DataSource, InitContext, Page, Row, RowUpdateSink, SourceMetadata,
};
pub use traits::{
    AlarmStateScope, EventKind, EventSubscription, MonitoringClient, MonitoringEvent,
    MonitoringEventStream, SubscriptionHandle,
};
