// Monitoring system entities
//
// Read-only records returned by the monitoring system, plus the identifiers
// the data source derives from them. Every record that identifies a row goes
// through `Keyed::row_key`, so rows, state snapshots and state-change events
// always agree on key format.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::alarm::AlarmLevel;

/// Identifier of a monitoring-system view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub i32);

impl ViewId {
    /// Sentinel used until the host binds a view id
    pub const UNSET: ViewId = ViewId(-1);

    pub fn is_unset(self) -> bool {
        self == Self::UNSET
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::UNSET
    }
}

impl From<i32> for ViewId {
    fn from(id: i32) -> Self {
        ViewId(id)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite row identity: `"{owner_id}/{entity_id}"`
///
/// Services and elements share this keyspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(String);

impl RowKey {
    pub fn new(owner_id: i32, entity_id: i32) -> Self {
        RowKey(format!("{}/{}", owner_id, entity_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for RowKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Anything addressed by (owning system, entity) in the monitoring system
pub trait Keyed {
    /// Id of the monitoring agent that owns the entity
    fn owner_id(&self) -> i32;

    /// Id of the service or element within its owner
    fn entity_id(&self) -> i32;

    fn row_key(&self) -> RowKey {
        RowKey::new(self.owner_id(), self.entity_id())
    }
}

/// A service as listed for a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub owner_id: i32,
    pub service_id: i32,
    pub name: String,
}

impl ServiceDescriptor {
    pub fn new(owner_id: i32, service_id: i32, name: impl Into<String>) -> Self {
        Self {
            owner_id,
            service_id,
            name: name.into(),
        }
    }
}

impl Keyed for ServiceDescriptor {
    fn owner_id(&self) -> i32 {
        self.owner_id
    }

    fn entity_id(&self) -> i32 {
        self.service_id
    }
}

/// Current alarm state of a service or element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmStateRecord {
    pub owner_id: i32,
    pub entity_id: i32,
    pub level: AlarmLevel,
}

impl AlarmStateRecord {
    pub fn new(owner_id: i32, entity_id: i32, level: AlarmLevel) -> Self {
        Self {
            owner_id,
            entity_id,
            level,
        }
    }
}

impl Keyed for AlarmStateRecord {
    fn owner_id(&self) -> i32 {
        self.owner_id
    }

    fn entity_id(&self) -> i32 {
        self.entity_id
    }
}

/// Pushed by the monitoring system when a service's alarm level changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmStateChangeEvent {
    pub owner_id: i32,
    pub service_id: i32,
    pub level: AlarmLevel,
}

impl AlarmStateChangeEvent {
    pub fn new(owner_id: i32, service_id: i32, level: AlarmLevel) -> Self {
        Self {
            owner_id,
            service_id,
            level,
        }
    }
}

impl Keyed for AlarmStateChangeEvent {
    fn owner_id(&self) -> i32 {
        self.owner_id
    }

    fn entity_id(&self) -> i32 {
        self.service_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_key_format() {
        assert_eq!(RowKey::new(1, 10).as_str(), "1/10");
        assert_eq!(RowKey::new(-1, 0).to_string(), "-1/0");
    }

    #[test]
    fn test_row_key_is_shared_across_record_kinds() {
        let service = ServiceDescriptor::new(7, 42, "Svc");
        let record = AlarmStateRecord::new(7, 42, AlarmLevel::Normal);
        let event = AlarmStateChangeEvent::new(7, 42, AlarmLevel::Major);

        assert_eq!(service.row_key(), record.row_key());
        assert_eq!(record.row_key(), event.row_key());
    }

    #[test]
    fn test_row_key_distinguishes_owner_and_entity() {
        assert_ne!(RowKey::new(1, 23), RowKey::new(12, 3));
        assert_ne!(RowKey::new(1, 10), RowKey::new(10, 1));
    }

    #[test]
    fn test_view_id_defaults_to_unset() {
        assert_eq!(ViewId::default(), ViewId::UNSET);
        assert!(ViewId::default().is_unset());
        assert!(!ViewId(5).is_unset());
    }
}
