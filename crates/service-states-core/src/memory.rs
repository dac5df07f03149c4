// In-memory implementations for examples and testing
//
// These implementations keep all data in memory, making them useful for:
// - Demos that don't need a monitoring system
// - Unit and integration tests
// - Exercising the live-update path deterministically

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, oneshot, Notify, RwLock};
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

use crate::entities::{AlarmStateRecord, RowKey, ServiceDescriptor, ViewId};
use crate::error::{Result, ServiceStateError};
use crate::host::{Cell, ColumnSpec, RowUpdateSink};
use crate::traits::{
    AlarmStateScope, EventKind, EventSubscription, MonitoringClient, MonitoringEvent,
    SubscriptionHandle,
};

/// Default number of undelivered events buffered per subscriber
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

// ============================================================================
// InMemoryMonitoringClient - Serves services, states and events from memory
// ============================================================================

struct ActiveSubscription {
    kind: EventKind,
    // Dropping the sender ends the subscription's event stream
    _close: oneshot::Sender<()>,
}

/// In-memory monitoring system
///
/// Like a real monitoring connection, every published event is delivered to
/// every open subscription regardless of the kind it was registered for.
#[derive(Clone)]
pub struct InMemoryMonitoringClient {
    views: Arc<RwLock<HashMap<ViewId, Vec<ServiceDescriptor>>>>,
    service_states: Arc<RwLock<Vec<AlarmStateRecord>>>,
    element_states: Arc<RwLock<Vec<AlarmStateRecord>>>,
    events: broadcast::Sender<MonitoringEvent>,
    subscriptions: Arc<RwLock<HashMap<SubscriptionHandle, ActiveSubscription>>>,
    fail_requests: Arc<AtomicBool>,
    fail_subscribe: Arc<AtomicBool>,
    service_requests: Arc<AtomicUsize>,
    state_requests: Arc<AtomicUsize>,
}

impl InMemoryMonitoringClient {
    /// Create an empty monitoring system
    pub fn new() -> Self {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Create an empty monitoring system with a custom event buffer size
    pub fn with_event_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            views: Arc::new(RwLock::new(HashMap::new())),
            service_states: Arc::new(RwLock::new(Vec::new())),
            element_states: Arc::new(RwLock::new(Vec::new())),
            events,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            fail_requests: Arc::new(AtomicBool::new(false)),
            fail_subscribe: Arc::new(AtomicBool::new(false)),
            service_requests: Arc::new(AtomicUsize::new(0)),
            state_requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the services listed for a view
    pub async fn seed_view(&self, view_id: ViewId, services: Vec<ServiceDescriptor>) {
        self.views.write().await.insert(view_id, services);
    }

    /// Set the current service alarm states
    pub async fn seed_service_states(&self, states: Vec<AlarmStateRecord>) {
        *self.service_states.write().await = states;
    }

    /// Set the current element alarm states
    pub async fn seed_element_states(&self, states: Vec<AlarmStateRecord>) {
        *self.element_states.write().await = states;
    }

    /// Deliver an event to all open subscriptions
    ///
    /// Returns the number of subscriptions that received it.
    pub fn publish(&self, event: MonitoringEvent) -> usize {
        self.events.send(event).unwrap_or(0)
    }

    /// Make every list request fail until reset
    pub fn fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }

    /// Make every subscribe call fail until reset
    pub fn fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    /// Number of open subscriptions
    pub async fn active_subscriptions(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    /// Kinds of the open subscriptions
    pub async fn subscribed_kinds(&self) -> Vec<EventKind> {
        self.subscriptions
            .read()
            .await
            .values()
            .map(|s| s.kind)
            .collect()
    }

    /// Number of service list requests served
    pub fn service_requests(&self) -> usize {
        self.service_requests.load(Ordering::SeqCst)
    }

    /// Number of alarm state requests served
    pub fn state_requests(&self) -> usize {
        self.state_requests.load(Ordering::SeqCst)
    }

    fn check_requests(&self) -> Result<()> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(ServiceStateError::request("monitoring system unavailable"));
        }
        Ok(())
    }
}

impl Default for InMemoryMonitoringClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MonitoringClient for InMemoryMonitoringClient {
    async fn list_services_for_view(&self, view_id: ViewId) -> Result<Vec<ServiceDescriptor>> {
        self.check_requests()?;
        self.service_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .views
            .read()
            .await
            .get(&view_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_current_alarm_states(
        &self,
        scope: AlarmStateScope,
    ) -> Result<Vec<AlarmStateRecord>> {
        self.check_requests()?;
        self.state_requests.fetch_add(1, Ordering::SeqCst);

        let mut states = Vec::new();
        if scope.services {
            states.extend(self.service_states.read().await.iter().cloned());
        }
        if scope.elements {
            states.extend(self.element_states.read().await.iter().cloned());
        }
        Ok(states)
    }

    async fn subscribe(&self, kind: EventKind) -> Result<EventSubscription> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(ServiceStateError::subscription(
                "monitoring system rejected subscription",
            ));
        }

        let handle = SubscriptionHandle::new();
        let (close_tx, close_rx) = oneshot::channel();
        let events = BroadcastStream::new(self.events.subscribe())
            // Lagged receivers skip what they missed
            .filter_map(|event| futures::future::ready(event.ok()))
            .take_until(close_rx)
            .boxed();

        self.subscriptions.write().await.insert(
            handle,
            ActiveSubscription {
                kind,
                _close: close_tx,
            },
        );
        debug!(handle = %handle, kind = ?kind, "Registered in-memory subscription");

        Ok(EventSubscription { handle, events })
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<()> {
        match self.subscriptions.write().await.remove(&handle) {
            Some(_) => {
                debug!(handle = %handle, "Released in-memory subscription");
                Ok(())
            }
            None => Err(ServiceStateError::subscription(format!(
                "unknown subscription {}",
                handle
            ))),
        }
    }
}

// ============================================================================
// InMemoryRowUpdateSink - Records cell updates pushed by a data source
// ============================================================================

/// A cell update as received by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub row_key: RowKey,
    pub column: String,
    pub cell: Cell,
}

/// In-memory row update sink
///
/// Records every update in arrival order and wakes waiters.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRowUpdateSink {
    updates: Arc<Mutex<Vec<CellUpdate>>>,
    notify: Arc<Notify>,
}

impl InMemoryRowUpdateSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All updates received so far
    pub fn updates(&self) -> Vec<CellUpdate> {
        self.updates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of updates received so far
    pub fn len(&self) -> usize {
        self.updates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until at least `count` updates arrived or `timeout` elapsed
    ///
    /// Returns all updates received at that point.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<CellUpdate> {
        let wait = async {
            loop {
                let notified = self.notify.notified();
                if self.len() >= count {
                    return;
                }
                notified.await;
            }
        };
        let _ = tokio::time::timeout(timeout, wait).await;
        self.updates()
    }
}

impl RowUpdateSink for InMemoryRowUpdateSink {
    fn update_cell(&self, row_key: &RowKey, column: &ColumnSpec, cell: Cell) {
        self.updates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(CellUpdate {
                row_key: row_key.clone(),
                column: column.name.clone(),
                cell,
            });
        self.notify.notify_waiters();
    }
}
