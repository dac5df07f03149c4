// Live state subscription
//
// Keeps the state column of an already served page current. A subscription
// owns two independent pieces:
// - RowKeyFilter: which events matter (key is one of the page's rows)
// - StateChangeHandler: what to do with them (push the level text to the host)
//
// Events are consumed by one tokio task per subscription. Every sink call
// happens under a read guard of the update gate; stop() takes the write
// guard and closes it, so no sink call can start once stop() has returned.

use futures::StreamExt;
use service_states_core::{
    AlarmStateChangeEvent, Cell, ColumnSpec, EventKind, Keyed, MonitoringClient,
    MonitoringEvent, MonitoringEventStream, Result, Row, RowKey, RowUpdateSink,
    SubscriptionHandle,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::rows::RowIndex;

// ============================================================================
// Filter and handler
// ============================================================================

/// Snapshot of the row keys of a page
///
/// Fixed at registration; rows are never added or removed afterwards.
#[derive(Debug, Clone, Default)]
pub struct RowKeyFilter {
    keys: Arc<HashSet<RowKey>>,
}

impl RowKeyFilter {
    pub fn from_index(index: &RowIndex<'_>) -> Self {
        Self {
            keys: Arc::new(index.keys().cloned().collect()),
        }
    }

    pub fn accepts(&self, key: &RowKey) -> bool {
        self.keys.contains(key)
    }

    /// Pick out a service state change addressed to one of the rows
    pub fn select<'e>(
        &self,
        event: &'e MonitoringEvent,
    ) -> Option<(RowKey, &'e AlarmStateChangeEvent)> {
        match event {
            MonitoringEvent::ServiceStateChanged(change) => {
                let key = change.row_key();
                self.accepts(&key).then_some((key, change))
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Pushes a state change into the host's state column
#[derive(Clone)]
pub struct StateChangeHandler {
    sink: Arc<dyn RowUpdateSink>,
    state_column: ColumnSpec,
}

impl StateChangeHandler {
    pub fn new(sink: Arc<dyn RowUpdateSink>, state_column: ColumnSpec) -> Self {
        Self { sink, state_column }
    }

    pub fn handle(&self, key: &RowKey, change: &AlarmStateChangeEvent) {
        self.sink
            .update_cell(key, &self.state_column, Cell::text(change.level.to_string()));
    }
}

// ============================================================================
// StateSubscription - Registration, delivery and teardown
// ============================================================================

/// A registered live-update subscription for one page
pub struct StateSubscription {
    handle: SubscriptionHandle,
    client: Arc<dyn MonitoringClient>,
    filter: RowKeyFilter,
    gate: Arc<RwLock<bool>>,
    task: Option<JoinHandle<()>>,
}

impl StateSubscription {
    /// Capture the page's keys and subscribe to service state changes
    ///
    /// Fails on duplicate row keys before subscribing. Subscription errors
    /// are returned as-is; nothing is retried.
    pub async fn register(
        client: Arc<dyn MonitoringClient>,
        rows: &[Row],
        sink: Arc<dyn RowUpdateSink>,
        state_column: ColumnSpec,
    ) -> Result<Self> {
        let filter = RowKeyFilter::from_index(&RowIndex::build(rows)?);
        let handler = StateChangeHandler::new(sink, state_column);

        let subscription = client.subscribe(EventKind::ServiceStateChanged).await?;
        let gate = Arc::new(RwLock::new(true));
        let task = tokio::spawn(deliver(
            subscription.events,
            filter.clone(),
            handler,
            gate.clone(),
        ));

        info!(
            handle = %subscription.handle,
            rows = filter.len(),
            "Subscribed to service alarm state changes"
        );

        Ok(Self {
            handle: subscription.handle,
            client,
            filter,
            gate,
            task: Some(task),
        })
    }

    pub fn handle(&self) -> SubscriptionHandle {
        self.handle
    }

    pub fn filter(&self) -> &RowKeyFilter {
        &self.filter
    }

    /// Stop delivering updates and release the subscription
    ///
    /// Waits for an in-progress sink call to finish; no sink call starts
    /// after this returns. Events still in flight are dropped.
    pub async fn stop(mut self) -> Result<()> {
        *self.gate.write().await = false;
        if let Some(task) = self.task.take() {
            task.abort();
        }

        self.client.unsubscribe(self.handle).await?;
        info!(handle = %self.handle, "Released service alarm state subscription");
        Ok(())
    }
}

impl Drop for StateSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            debug!(handle = %self.handle, "Subscription dropped without stop, aborting delivery");
            task.abort();
            if let Ok(mut open) = self.gate.try_write() {
                *open = false;
            }
        }
    }
}

async fn deliver(
    mut events: MonitoringEventStream,
    filter: RowKeyFilter,
    handler: StateChangeHandler,
    gate: Arc<RwLock<bool>>,
) {
    while let Some(event) = events.next().await {
        let Some((key, change)) = filter.select(&event) else {
            trace!(event = ?event, "Discarding event for untracked row");
            continue;
        };

        let open = gate.read().await;
        if !*open {
            break;
        }
        handler.handle(&key, change);
    }
}
