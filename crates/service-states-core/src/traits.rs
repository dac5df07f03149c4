// Monitoring system contract
//
// The data source talks to the monitoring system only through
// MonitoringClient. Implementations can:
// - Forward requests to a live monitoring connection
// - Serve fixed data from memory for tests and demos

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::pin::Pin;
use uuid::Uuid;

use crate::alarm::AlarmLevel;
use crate::entities::{AlarmStateChangeEvent, AlarmStateRecord, ServiceDescriptor, ViewId};
use crate::error::Result;

/// Which entities a current-state query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmStateScope {
    pub services: bool,
    pub elements: bool,
}

impl AlarmStateScope {
    pub const SERVICES_ONLY: AlarmStateScope = AlarmStateScope {
        services: true,
        elements: false,
    };
}

/// Event kinds a subscription can be filtered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ServiceStateChanged,
    ElementStateChanged,
}

/// Messages delivered on a subscription's event stream
///
/// The monitoring connection may deliver more than the subscribed kind;
/// consumers match on the variant they care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitoringEvent {
    ServiceStateChanged(AlarmStateChangeEvent),
    ElementStateChanged {
        owner_id: i32,
        element_id: i32,
        level: AlarmLevel,
    },
    Other {
        kind: String,
    },
}

impl MonitoringEvent {
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            MonitoringEvent::ServiceStateChanged(_) => Some(EventKind::ServiceStateChanged),
            MonitoringEvent::ElementStateChanged { .. } => Some(EventKind::ElementStateChanged),
            MonitoringEvent::Other { .. } => None,
        }
    }
}

/// Identifies a registered subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionHandle(pub Uuid);

impl SubscriptionHandle {
    pub fn new() -> Self {
        SubscriptionHandle(Uuid::now_v7())
    }
}

impl Default for SubscriptionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type alias for the event stream of a subscription
pub type MonitoringEventStream = Pin<Box<dyn Stream<Item = MonitoringEvent> + Send>>;

/// A registered subscription and the events it delivers
pub struct EventSubscription {
    pub handle: SubscriptionHandle,
    pub events: MonitoringEventStream,
}

impl fmt::Debug for EventSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSubscription")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// MonitoringClient - Requests and subscriptions against the monitoring system
// ============================================================================

#[async_trait]
pub trait MonitoringClient: Send + Sync {
    /// List the services belonging to a view, in monitoring-system order
    async fn list_services_for_view(&self, view_id: ViewId) -> Result<Vec<ServiceDescriptor>>;

    /// Snapshot of current alarm states for the given scope
    async fn list_current_alarm_states(
        &self,
        scope: AlarmStateScope,
    ) -> Result<Vec<AlarmStateRecord>>;

    /// Register for events of one kind
    async fn subscribe(&self, kind: EventKind) -> Result<EventSubscription>;

    /// Release a subscription; its event stream ends
    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<()>;
}
