use crate::client::DeviceClientError;
use crate::domain::commands::Command;
use crate::host::Host;
use crate::supervisor::ConnectionSupervisor;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Sends control commands to the controller and asks the host to re-evaluate the
/// feedbacks that depend on the controlled entity.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    supervisor: ConnectionSupervisor,
    host: Arc<dyn Host>,
}

impl CommandDispatcher {
    pub fn new(supervisor: ConnectionSupervisor, host: Arc<dyn Host>) -> Self {
        CommandDispatcher { supervisor, host }
    }

    /// Failures are logged and never returned; the control surface stays usable.
    /// Re-evaluation is requested whatever the outcome.
    #[instrument(skip_all, fields(command = command.id()))]
    pub async fn dispatch(&self, command: Command) {
        match self.try_dispatch(&command).await {
            Ok(()) => debug!("🎛️ {} success: true", command.id()),
            Err(DispatchError::NotConnected) => warn!("⚠️ Dropping {:?}, not connected to a controller", command),
            Err(e) => warn!("⚠️ {} success: false, {}", command.id(), e),
        }

        self.host.check_feedbacks(&[command.feedback_kind()]);
    }

    async fn try_dispatch(&self, command: &Command) -> Result<(), DispatchError> {
        let client = self.supervisor.client().await.ok_or(DispatchError::NotConnected)?;

        match *command {
            Command::ControlTimeline { timeline, action } => {
                info!(num = timeline, "🎛️ Timeline {}: {}", timeline, action.as_str());
                client.control_timeline(timeline, action).await?
            }
            Command::ControlScene { scene, action } => {
                info!(num = scene, "🎛️ Scene {}: {}", scene, action.as_str());
                client.control_scene(scene, action).await?
            }
            Command::ControlGroup { group, action } => {
                info!(num = group, "🎛️ Group {}: {}", group, action.as_str());
                client.control_group(group, action).await?
            }
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("not connected to a controller")]
    NotConnected,
    #[error("command failed: {0}")]
    CommandFailure(#[from] DeviceClientError),
}
