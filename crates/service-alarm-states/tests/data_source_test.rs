// Integration tests for the service alarm states data source
//
// These tests drive the full host lifecycle (init, bind, columns, page,
// updates) against the in-memory monitoring system and update sink.

use service_states_core::memory::{InMemoryMonitoringClient, InMemoryRowUpdateSink};
use service_states_core::{
    AlarmLevel, AlarmStateChangeEvent, AlarmStateRecord, ArgumentValue, ArgumentValues, Cell,
    DataSource, InitContext, MonitoringEvent, ServiceDescriptor, ServiceStateError, ViewId,
};
use service_alarm_states::{ServiceAlarmStates, SourceConfig, NAME_CELL, STATE_CELL};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

async fn monitoring_with_view_five() -> InMemoryMonitoringClient {
    let client = InMemoryMonitoringClient::new();
    client
        .seed_view(
            ViewId(5),
            vec![
                ServiceDescriptor::new(1, 10, "Svc A"),
                ServiceDescriptor::new(1, 11, "Svc B"),
            ],
        )
        .await;
    client
        .seed_service_states(vec![AlarmStateRecord::new(1, 10, AlarmLevel::Critical)])
        .await;
    client
}

fn bound_source(client: &InMemoryMonitoringClient, view_id: i32) -> ServiceAlarmStates {
    let mut source = ServiceAlarmStates::new(SourceConfig::default());
    source
        .on_init(InitContext::new(Arc::new(client.clone())))
        .unwrap();
    let args = ArgumentValues::new().with("View ID", ArgumentValue::Int(view_id));
    source.on_arguments_processed(&args).unwrap();
    source
}

fn state_change(owner_id: i32, service_id: i32, level: AlarmLevel) -> MonitoringEvent {
    MonitoringEvent::ServiceStateChanged(AlarmStateChangeEvent::new(owner_id, service_id, level))
}

// =============================================================================
// Static pages
// =============================================================================

#[tokio::test]
async fn test_static_page_joins_current_states() {
    let client = monitoring_with_view_five().await;
    let mut source = bound_source(&client, 5);

    let page = source.next_page().await.unwrap();

    assert!(!page.has_next_page);
    assert_eq!(page.rows.len(), 2);

    assert_eq!(page.rows[0].key.as_str(), "1/10");
    assert_eq!(page.rows[0].cells[NAME_CELL], Cell::text("Svc A"));
    assert_eq!(page.rows[0].cells[STATE_CELL], Cell::text("Critical"));

    assert_eq!(page.rows[1].key.as_str(), "1/11");
    assert_eq!(page.rows[1].cells[NAME_CELL], Cell::text("Svc B"));
    assert!(page.rows[1].cells[STATE_CELL].is_empty());

    assert_eq!(client.state_requests(), 1);
    assert_eq!(client.active_subscriptions().await, 0);
}

#[tokio::test]
async fn test_unbound_view_uses_unset_sentinel() {
    let client = monitoring_with_view_five().await;
    client
        .seed_view(ViewId::UNSET, vec![ServiceDescriptor::new(3, 1, "Fallback")])
        .await;

    let mut source = ServiceAlarmStates::default();
    source
        .on_init(InitContext::new(Arc::new(client.clone())))
        .unwrap();

    let page = source.next_page().await.unwrap();

    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].key.as_str(), "3/1");
}

#[tokio::test]
async fn test_empty_view_gives_empty_final_page() {
    let client = monitoring_with_view_five().await;
    let mut source = bound_source(&client, 77);

    let page = source.next_page().await.unwrap();

    assert!(page.rows.is_empty());
    assert!(!page.has_next_page);
}

#[tokio::test]
async fn test_upstream_failure_fails_the_page() {
    let client = monitoring_with_view_five().await;
    client.fail_requests(true);
    let mut source = bound_source(&client, 5);

    let result = source.next_page().await;

    assert!(matches!(result, Err(ServiceStateError::Request(_))));
}

// =============================================================================
// Live updates
// =============================================================================

#[tokio::test]
async fn test_live_page_leaves_states_empty_and_subscribes() {
    let client = monitoring_with_view_five().await;
    let sink = InMemoryRowUpdateSink::new();
    let mut source = bound_source(&client, 5);
    source.on_start_updates(Arc::new(sink.clone())).unwrap();

    let page = source.next_page().await.unwrap();

    assert!(!page.has_next_page);
    assert!(page.rows.iter().all(|r| r.cells[STATE_CELL].is_empty()));
    assert_eq!(client.state_requests(), 0);
    assert_eq!(client.active_subscriptions().await, 1);
    assert!(source.is_subscribed());

    source.on_stop_updates().await.unwrap();
}

#[tokio::test]
async fn test_live_updates_only_for_rows_on_the_page() {
    let client = monitoring_with_view_five().await;
    let sink = InMemoryRowUpdateSink::new();
    let mut source = bound_source(&client, 5);
    source.on_start_updates(Arc::new(sink.clone())).unwrap();
    source.next_page().await.unwrap();

    client.publish(state_change(1, 10, AlarmLevel::Minor));
    client.publish(state_change(2, 99, AlarmLevel::Major));
    client.publish(MonitoringEvent::ElementStateChanged {
        owner_id: 1,
        element_id: 11,
        level: AlarmLevel::Critical,
    });
    client.publish(state_change(1, 11, AlarmLevel::Normal));

    let updates = sink.wait_for(2, WAIT).await;

    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].row_key.as_str(), "1/10");
    assert_eq!(updates[0].column, "Alarm state");
    assert_eq!(updates[0].cell, Cell::text("Minor"));
    assert_eq!(updates[1].row_key.as_str(), "1/11");
    assert_eq!(updates[1].cell, Cell::text("Normal"));

    source.on_stop_updates().await.unwrap();
}

#[tokio::test]
async fn test_unknown_level_is_pushed_as_its_code() {
    let client = monitoring_with_view_five().await;
    let sink = InMemoryRowUpdateSink::new();
    let mut source = bound_source(&client, 5);
    source.on_start_updates(Arc::new(sink.clone())).unwrap();
    source.next_page().await.unwrap();

    client.publish(state_change(1, 10, AlarmLevel::from_code(99)));

    let updates = sink.wait_for(1, WAIT).await;
    assert_eq!(updates[0].cell, Cell::text("99"));

    source.on_stop_updates().await.unwrap();
}

#[tokio::test]
async fn test_stop_updates_releases_subscription_and_silences_sink() {
    let client = monitoring_with_view_five().await;
    let sink = InMemoryRowUpdateSink::new();
    let mut source = bound_source(&client, 5);
    source.on_start_updates(Arc::new(sink.clone())).unwrap();
    source.next_page().await.unwrap();

    client.publish(state_change(1, 10, AlarmLevel::Major));
    assert_eq!(sink.wait_for(1, WAIT).await.len(), 1);

    source.on_stop_updates().await.unwrap();

    assert!(!source.is_subscribed());
    assert_eq!(client.active_subscriptions().await, 0);

    for _ in 0..10 {
        client.publish(state_change(1, 11, AlarmLevel::Critical));
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(sink.len(), 1);

    // A second stop has nothing left to release
    source.on_stop_updates().await.unwrap();
}

#[tokio::test]
async fn test_subscription_failure_fails_the_page() {
    let client = monitoring_with_view_five().await;
    client.fail_subscribe(true);
    let mut source = bound_source(&client, 5);
    source
        .on_start_updates(Arc::new(InMemoryRowUpdateSink::new()))
        .unwrap();

    let result = source.next_page().await;

    assert!(matches!(result, Err(ServiceStateError::Subscription(_))));
    assert_eq!(client.active_subscriptions().await, 0);
}

#[tokio::test]
async fn test_duplicate_services_fail_fast_in_both_modes() {
    let client = InMemoryMonitoringClient::new();
    client
        .seed_view(
            ViewId(8),
            vec![
                ServiceDescriptor::new(4, 2, "Twin"),
                ServiceDescriptor::new(4, 2, "Twin"),
            ],
        )
        .await;

    let mut static_source = bound_source(&client, 8);
    let result = static_source.next_page().await;
    assert!(matches!(result, Err(ServiceStateError::DuplicateRowKey(_))));

    let mut live_source = bound_source(&client, 8);
    live_source
        .on_start_updates(Arc::new(InMemoryRowUpdateSink::new()))
        .unwrap();
    let result = live_source.next_page().await;
    assert!(matches!(result, Err(ServiceStateError::DuplicateRowKey(_))));
    assert_eq!(client.active_subscriptions().await, 0);
}
