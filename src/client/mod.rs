use crate::domain::commands::{GroupAction, SceneAction, TimelineAction};
use crate::domain::{Group, Scene, Timeline};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

/// The controller's control API. Implementations own their transport, which is
/// released when the client is dropped.
#[async_trait]
pub trait DeviceClient: Debug + Send + Sync {
    async fn authenticate(&self, user: &str, password: &str) -> Result<(), DeviceClientError>;

    async fn groups(&self) -> Result<Vec<Group>, DeviceClientError>;

    async fn scenes(&self) -> Result<Vec<Scene>, DeviceClientError>;

    async fn timelines(&self) -> Result<Vec<Timeline>, DeviceClientError>;

    async fn control_group(&self, num: u32, action: GroupAction) -> Result<(), DeviceClientError>;

    async fn control_scene(&self, num: u32, action: SceneAction) -> Result<(), DeviceClientError>;

    async fn control_timeline(&self, num: u32, action: TimelineAction) -> Result<(), DeviceClientError>;

    async fn logout(&self) -> Result<(), DeviceClientError>;
}

/// Creates a client for the controller at `host`. Called once per connection attempt.
pub trait ClientFactory: Debug + Send + Sync {
    fn create(&self, host: &str) -> Result<Arc<dyn DeviceClient>, DeviceClientError>;
}

#[derive(Error, Debug)]
pub enum DeviceClientError {
    #[error("authentication rejected: {0}")]
    Unauthorized(String),
    #[error("request to the controller failed: {0}")]
    Request(String),
    #[error("controller rejected the request: {0}")]
    Rejected(String),
    #[error("invalid controller address '{0}'")]
    InvalidHost(String),
}
