//! Live View Example - One static page, then live alarm state updates
//!
//! Runs the data source against the in-memory monitoring system: serves a
//! reconciled page, then a live page whose state column is filled by
//! published state changes.
//!
//! Run with: RUST_LOG=debug cargo run -p service-alarm-states --example live_view

use service_alarm_states::{ServiceAlarmStates, SourceConfig, NAME_CELL, STATE_CELL};
use service_states_core::{
    memory::{InMemoryMonitoringClient, InMemoryRowUpdateSink},
    AlarmLevel, AlarmStateChangeEvent, AlarmStateRecord, ArgumentValue, ArgumentValues,
    DataSource, InitContext, MonitoringEvent, Page, ServiceDescriptor, ViewId,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn print_page(page: &Page) {
    for row in &page.rows {
        let name = row.cells[NAME_CELL].value.as_deref().unwrap_or("");
        let state = row.cells[STATE_CELL].value.as_deref().unwrap_or("-");
        println!("  {:<8} {:<12} {}", row.key, name, state);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Service alarm states ===\n");

    // 1. Seed a monitoring system with one view
    let monitoring = InMemoryMonitoringClient::new();
    monitoring
        .seed_view(
            ViewId(5),
            vec![
                ServiceDescriptor::new(1, 10, "Svc A"),
                ServiceDescriptor::new(1, 11, "Svc B"),
            ],
        )
        .await;
    monitoring
        .seed_service_states(vec![AlarmStateRecord::new(1, 10, AlarmLevel::Critical)])
        .await;

    let config = SourceConfig::from_env();
    let args = ArgumentValues::new().with(config.view_argument.clone(), ArgumentValue::Int(5));

    // 2. Static page: states joined once
    let mut source = ServiceAlarmStates::new(config.clone());
    source.on_init(InitContext::new(Arc::new(monitoring.clone())))?;
    source.on_arguments_processed(&args)?;

    println!("{} (static):", source.metadata().name);
    print_page(&source.next_page().await?);

    // 3. Live page: states pushed by events
    let sink = InMemoryRowUpdateSink::new();
    let mut live = ServiceAlarmStates::new(config);
    live.on_init(InitContext::new(Arc::new(monitoring.clone())))?;
    live.on_arguments_processed(&args)?;
    live.on_start_updates(Arc::new(sink.clone()))?;

    println!("\n{} (live):", live.metadata().name);
    print_page(&live.next_page().await?);

    for (service_id, level) in [(10, AlarmLevel::Minor), (11, AlarmLevel::Major)] {
        monitoring.publish(MonitoringEvent::ServiceStateChanged(
            AlarmStateChangeEvent::new(1, service_id, level),
        ));
    }
    // Not on the page, never reaches the sink
    monitoring.publish(MonitoringEvent::ServiceStateChanged(
        AlarmStateChangeEvent::new(2, 99, AlarmLevel::Critical),
    ));

    println!("\nUpdates:");
    for update in sink.wait_for(2, Duration::from_secs(1)).await {
        println!(
            "  {:<8} {} = {}",
            update.row_key,
            update.column,
            update.cell.value.unwrap_or_default()
        );
    }

    live.on_stop_updates().await?;
    Ok(())
}
