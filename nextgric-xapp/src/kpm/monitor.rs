//! KPM monitor task
//!
//! Subscribes to E2SM-KPM on every connected node, one subscription per
//! configured slice filter, and removes the subscriptions on shutdown.
//! Indications flow from the runtime straight into the indication callback;
//! the task itself only owns the subscription lifecycle.

use std::sync::Arc;

use nextgric_common::{HexDump, KpmConfig};
use nextgric_e2sm::kpm::build_subscription;
use nextgric_e2sm::SchemaError;
use tracing::{info, warn};

use crate::e2::{E2Runtime, IndicationCallback, RanFunctionDefinition, SubscriptionHandle};
use crate::tasks::{wait_for_shutdown, ShutdownReceiver, Task, TaskError, TaskId};

pub struct KpmMonitor {
    runtime: Arc<dyn E2Runtime>,
    config: KpmConfig,
    callback: IndicationCallback,
    handles: Vec<SubscriptionHandle>,
}

impl KpmMonitor {
    pub fn new(
        runtime: Arc<dyn E2Runtime>,
        config: KpmConfig,
        callback: IndicationCallback,
    ) -> Self {
        Self {
            runtime,
            config,
            callback,
            handles: Vec::new(),
        }
    }

    /// Active subscription handles.
    pub fn handles(&self) -> &[SubscriptionHandle] {
        &self.handles
    }

    /// Subscribes on every connected node.
    ///
    /// A node without the configured KPM function, or exposing a different
    /// service model under its id, is a schema error. A node advertising no
    /// REPORT style is skipped. Subscriptions the runtime fails to set up
    /// are logged and skipped.
    pub async fn subscribe_all(&mut self) -> Result<usize, SchemaError> {
        let ran_function_id = self.config.ran_function_id;
        let nodes = self.runtime.connected_nodes();
        info!(nodes = nodes.len(), "Subscribing to KPM");

        for node in &nodes {
            let ran_function = node
                .ran_function(ran_function_id)
                .ok_or(SchemaError::MissingRanFunction(ran_function_id))?;
            let definition = match &ran_function.definition {
                RanFunctionDefinition::Kpm(def) => def,
                _ => return Err(SchemaError::NotKpmFunction(ran_function_id)),
            };

            if definition.report_styles.is_empty() {
                warn!(node = %node.id, "No REPORT style advertised, skipping node");
                continue;
            }

            for filter in &self.config.slice_filters {
                let octets = filter.filter_octets();
                let subscription = build_subscription(definition, octets)?;
                match self
                    .runtime
                    .subscribe_kpm(&node.id, ran_function_id, subscription, self.callback.clone())
                    .await
                {
                    Ok(handle) => {
                        info!(
                            node = %node.id,
                            filter = %HexDump(&octets),
                            %handle,
                            "KPM subscription established"
                        );
                        self.handles.push(handle);
                    }
                    Err(e) => {
                        warn!(node = %node.id, slice = %filter, "KPM subscription failed: {}", e)
                    }
                }
            }
        }

        Ok(self.handles.len())
    }

    /// Deletes every active subscription.
    pub async fn unsubscribe_all(&mut self) {
        for handle in self.handles.drain(..) {
            if let Err(e) = self.runtime.unsubscribe(handle).await {
                warn!(%handle, "KPM unsubscribe failed: {}", e);
            }
        }
    }
}

#[async_trait::async_trait]
impl Task for KpmMonitor {
    fn id(&self) -> TaskId {
        TaskId::Monitor
    }

    async fn run(&mut self, mut shutdown: ShutdownReceiver) -> Result<(), TaskError> {
        let count = self
            .subscribe_all()
            .await
            .map_err(|e| TaskError::fatal(TaskId::Monitor, e.to_string()))?;
        info!(subscriptions = count, "KPM monitor running");

        let reason = wait_for_shutdown(&mut shutdown).await;
        info!("KPM monitor stopping: {}", reason);
        self.unsubscribe_all().await;
        Ok(())
    }
}
