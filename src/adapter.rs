use crate::app_config::{AdapterConfig, ConfigError};
use crate::client::ClientFactory;
use crate::definitions::{action_definitions, feedback_definitions};
use crate::dispatcher::CommandDispatcher;
use crate::domain::commands::Command;
use crate::domain::feedback::{FeedbackKind, FeedbackRequest};
use crate::domain::session::ConnectionStatus;
use crate::evaluator::FeedbackEvaluator;
use crate::host::Host;
use crate::inventory::Inventory;
use crate::supervisor::{ConnectionSupervisor, SessionOutcome};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// One adapter instance bound to one controller. All state lives here, so several
/// adapters can run side by side.
#[derive(Debug)]
pub struct Adapter {
    host: Arc<dyn Host>,
    supervisor: ConnectionSupervisor,
    evaluator: FeedbackEvaluator,
    dispatcher: CommandDispatcher,
}

impl Adapter {
    pub fn new(factory: Arc<dyn ClientFactory>, host: Arc<dyn Host>) -> Self {
        let supervisor = ConnectionSupervisor::new(factory, host.clone());
        Adapter {
            evaluator: FeedbackEvaluator::new(supervisor.clone()),
            dispatcher: CommandDispatcher::new(supervisor.clone(), host.clone()),
            supervisor,
            host,
        }
    }

    /// Publishes the definitions for the inventory known so far and (re)connects.
    #[instrument(skip_all)]
    pub async fn init(&self, config: &AdapterConfig) -> Result<SessionOutcome, ConfigError> {
        config.validate()?;
        info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

        let inventory = self.supervisor.inventory().snapshot();
        self.host.set_action_definitions(action_definitions(&inventory));
        self.host.set_feedback_definitions(feedback_definitions(&inventory));

        Ok(self.supervisor.connect(config).await)
    }

    pub async fn config_updated(&self, config: &AdapterConfig) -> Result<SessionOutcome, ConfigError> {
        debug!("⚙️ Configuration updated");
        self.init(config).await
    }

    pub async fn destroy(&self) {
        debug!("🔌 Destroying adapter...");
        self.supervisor.disconnect().await;
        debug!("🔌 Destroying adapter... OK");
    }

    /// Evaluates a feedback from the raw button options. Malformed options are indeterminate.
    pub async fn evaluate(&self, kind: FeedbackKind, options: Value) -> Option<bool> {
        match FeedbackRequest::from_options(kind, options) {
            Ok(request) => self.evaluator.evaluate(&request).await,
            Err(e) => {
                warn!(%kind, "⚠️ Ignoring feedback with {}", e);
                None
            }
        }
    }

    pub async fn dispatch(&self, command: Command) {
        self.dispatcher.dispatch(command).await
    }

    /// Runs a button action from its raw options. Malformed options are logged and dropped.
    pub async fn dispatch_action(&self, action_id: &str, options: Value) {
        match Command::from_options(action_id, options) {
            Ok(command) => self.dispatch(command).await,
            Err(e) => warn!(action_id, "⚠️ Ignoring action: {}", e),
        }
    }

    pub fn inventory(&self) -> Inventory {
        self.supervisor.inventory().snapshot()
    }

    pub fn subscribe_inventory(&self) -> watch::Receiver<Inventory> {
        self.supervisor.inventory().subscribe()
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.supervisor.status().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AdapterConfigBuilder;
    use crate::domain::{DeviceKind, SceneState, TimelineState};
    use crate::testing::{FakeDevice, FakeFactory, HostEvent, RecordingHost};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_log::test;

    fn device() -> FakeDevice {
        FakeDevice::new()
            .with_group(Some(1), "House lights", 60.0)
            .with_scene(Some(2), "Preset", SceneState::Released)
            .with_timeline(Some(3), "Show", TimelineState::Released)
    }

    fn adapter(device: Arc<FakeDevice>) -> (Adapter, Arc<RecordingHost>) {
        let host = Arc::new(RecordingHost::new());
        (Adapter::new(Arc::new(FakeFactory::single(device)), host.clone()), host)
    }

    #[test(tokio::test)]
    async fn publishes_empty_definitions_before_connecting() -> Result<(), ConfigError> {
        let (adapter, host) = adapter(Arc::new(device()));

        adapter.init(&AdapterConfigBuilder::new().build()).await?;

        let updates = host.feedback_definition_updates();
        assert_eq!(updates.len(), 2);
        assert!(matches!(host.events().first(), Some(HostEvent::ActionDefinitions(_))));
        assert_eq!(updates[0], feedback_definitions(&Inventory::empty()));
        assert_eq!(updates[1], feedback_definitions(&adapter.inventory()));
        Ok(())
    }

    #[test(tokio::test)]
    async fn rejects_an_invalid_host_without_connecting() {
        let (adapter, host) = adapter(Arc::new(device()));

        let result = adapter.init(&AdapterConfigBuilder::new().host("not-an-ip").build()).await;

        assert!(matches!(result, Err(ConfigError::InvalidHost(_))));
        assert!(host.events().is_empty());
    }

    #[test(tokio::test)]
    async fn drives_and_reflects_the_controller_from_raw_options() -> Result<(), ConfigError> {
        let (adapter, host) = adapter(Arc::new(device()));
        adapter.init(&AdapterConfigBuilder::new().build()).await?;

        let running = json!({ "timeline": "3", "state": "running" });
        assert_eq!(adapter.evaluate(FeedbackKind::TimelineState, running.clone()).await, Some(false));

        adapter.dispatch_action("controlTimeline", json!({ "timeline": 3, "action": "start" })).await;
        assert_eq!(adapter.evaluate(FeedbackKind::TimelineState, running).await, Some(true));

        adapter
            .dispatch_action("controlGroup", json!({ "group": 1, "action": "level", "level": 0, "fade": 0 }))
            .await;
        let dark = json!({ "group": 1, "operation": "equal", "level": 0 });
        assert_eq!(adapter.evaluate(FeedbackKind::GroupState, dark).await, Some(true));

        assert_eq!(host.checked_feedbacks(), vec![FeedbackKind::TimelineState, FeedbackKind::GroupState]);
        Ok(())
    }

    #[test(tokio::test)]
    async fn malformed_options_are_indeterminate_or_dropped() -> Result<(), ConfigError> {
        let device = Arc::new(device());
        let (adapter, host) = adapter(device.clone());
        adapter.init(&AdapterConfigBuilder::new().build()).await?;

        let verdict = adapter.evaluate(FeedbackKind::SceneState, json!({ "scene": 2, "state": "dimmed" })).await;
        adapter.dispatch_action("controlScene", json!({ "scene": "", "action": "start" })).await;

        assert_eq!(verdict, None);
        assert!(device.commands().is_empty());
        assert!(host.checked_feedbacks().is_empty());
        Ok(())
    }

    #[test(tokio::test)]
    async fn keeps_serving_the_last_inventory_after_destroy() -> Result<(), ConfigError> {
        let device = Arc::new(device());
        let (adapter, _host) = adapter(device.clone());
        adapter.init(&AdapterConfigBuilder::new().build()).await?;
        let mut rx = adapter.subscribe_inventory();

        adapter.destroy().await;

        assert_eq!(adapter.status().await, ConnectionStatus::Disconnected);
        assert!(device.logged_out());
        assert_eq!(adapter.inventory().entries(DeviceKind::Timeline).len(), 1);
        assert!(!rx.has_changed().unwrap());
        Ok(())
    }

    #[test(tokio::test)]
    async fn adapters_do_not_share_state() -> Result<(), ConfigError> {
        let (first, _) = adapter(Arc::new(device()));
        let (second, _) = adapter(Arc::new(FakeDevice::new().rejecting_authentication()));

        first.init(&AdapterConfigBuilder::new().build()).await?;
        second.init(&AdapterConfigBuilder::new().host("10.0.0.21").build()).await?;

        assert_eq!(first.status().await, ConnectionStatus::Connected);
        assert_eq!(second.status().await, ConnectionStatus::Error);
        assert!(second.inventory().groups().is_empty());
        Ok(())
    }
}
