// Service alarm states data source
//
// Drives row building and state reconciliation from the host lifecycle:
// - without updates, the page's state column is filled from a one-shot query
// - with updates, the page is returned with empty states and a subscription
//   pushes every matching state change to the host's sink

use async_trait::async_trait;
use service_states_core::{
    ArgumentSpec, ArgumentValue, ArgumentValues, ColumnSpec, DataSource, InitContext,
    MonitoringClient, Page, Result, RowUpdateSink, ServiceStateError, SourceMetadata, ViewId,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::reconcile::apply_current_states;
use crate::rows::build_rows;
use crate::subscription::StateSubscription;

/// Where the source is in its update lifecycle
enum UpdateMode {
    /// No updates requested; pages are reconciled once
    Static,
    /// The host asked for updates; subscribing happens with the page
    Requested(Arc<dyn RowUpdateSink>),
    /// Live updates flowing for the served page
    Subscribed(StateSubscription),
    /// Updates were stopped by the host
    Stopped,
}

/// Lists the services of one view with their alarm state
pub struct ServiceAlarmStates {
    config: SourceConfig,
    client: Option<Arc<dyn MonitoringClient>>,
    view_argument: ArgumentSpec,
    name_column: ColumnSpec,
    state_column: ColumnSpec,
    view_id: ViewId,
    updates: UpdateMode,
    page_served: bool,
}

impl ServiceAlarmStates {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            view_argument: ArgumentSpec::required_int(config.view_argument.clone()),
            name_column: ColumnSpec::string(config.name_column.clone()),
            state_column: ColumnSpec::string(config.state_column.clone()),
            config,
            client: None,
            view_id: ViewId::UNSET,
            updates: UpdateMode::Static,
            page_served: false,
        }
    }

    /// View id the next page is built for
    pub fn view_id(&self) -> ViewId {
        self.view_id
    }

    /// Whether a live subscription is currently registered
    pub fn is_subscribed(&self) -> bool {
        matches!(self.updates, UpdateMode::Subscribed(_))
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }
}

impl Default for ServiceAlarmStates {
    fn default() -> Self {
        Self::new(SourceConfig::default())
    }
}

#[async_trait]
impl DataSource for ServiceAlarmStates {
    fn metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: self.config.display_name.clone(),
        }
    }

    fn on_init(&mut self, ctx: InitContext) -> Result<()> {
        self.client = Some(ctx.client);
        Ok(())
    }

    fn input_arguments(&self) -> Vec<ArgumentSpec> {
        vec![self.view_argument.clone()]
    }

    fn on_arguments_processed(&mut self, args: &ArgumentValues) -> Result<()> {
        match args.get(&self.view_argument) {
            Some(ArgumentValue::Int(id)) => {
                self.view_id = ViewId(*id);
                debug!(view_id = %self.view_id, "Bound view id");
            }
            Some(other) => {
                return Err(ServiceStateError::invalid_argument(format!(
                    "'{}' expects an integer, got {:?}",
                    self.view_argument.name, other
                )));
            }
            None => {}
        }
        Ok(())
    }

    fn columns(&self) -> Vec<ColumnSpec> {
        vec![self.name_column.clone(), self.state_column.clone()]
    }

    fn on_start_updates(&mut self, sink: Arc<dyn RowUpdateSink>) -> Result<()> {
        if self.page_served {
            return Err(ServiceStateError::invalid_state(
                "updates must be requested before the page is fetched",
            ));
        }
        self.updates = UpdateMode::Requested(sink);
        Ok(())
    }

    async fn next_page(&mut self) -> Result<Page> {
        let client = self
            .client
            .clone()
            .ok_or(ServiceStateError::NotInitialized)?;
        if self.is_subscribed() {
            return Err(ServiceStateError::invalid_state(
                "live updates are already registered for the served page",
            ));
        }

        let mut rows = build_rows(client.as_ref(), self.view_id).await?;

        match std::mem::replace(&mut self.updates, UpdateMode::Static) {
            UpdateMode::Requested(sink) => {
                let registered = StateSubscription::register(
                    client,
                    &rows,
                    sink.clone(),
                    self.state_column.clone(),
                )
                .await;
                match registered {
                    Ok(subscription) => self.updates = UpdateMode::Subscribed(subscription),
                    Err(e) => {
                        self.updates = UpdateMode::Requested(sink);
                        return Err(e);
                    }
                }
            }
            mode => {
                self.updates = mode;
                apply_current_states(client.as_ref(), &mut rows).await?;
            }
        }

        self.page_served = true;
        info!(
            view_id = %self.view_id,
            rows = rows.len(),
            live = self.is_subscribed(),
            "Served service alarm states page"
        );
        Ok(Page::last(rows))
    }

    async fn on_stop_updates(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.updates, UpdateMode::Stopped) {
            UpdateMode::Subscribed(subscription) => subscription.stop().await,
            _ => Ok(()),
        }
    }
}
