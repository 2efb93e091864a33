use crate::client::{DeviceClient, DeviceClientError};
use crate::domain::feedback::FeedbackRequest;
use crate::domain::{DeviceKind, InventoryItem};
use crate::supervisor::ConnectionSupervisor;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Evaluates feedback predicates against the live state of the controller. Nothing is
/// cached: every evaluation queries the controller again.
#[derive(Debug, Clone)]
pub struct FeedbackEvaluator {
    supervisor: ConnectionSupervisor,
}

impl FeedbackEvaluator {
    pub fn new(supervisor: ConnectionSupervisor) -> Self {
        FeedbackEvaluator { supervisor }
    }

    /// Returns `None` when no verdict can be given, in which case the button keeps its
    /// current appearance.
    #[instrument(skip_all, fields(kind = %request.kind()))]
    pub async fn evaluate(&self, request: &FeedbackRequest) -> Option<bool> {
        match self.try_evaluate(request).await {
            Ok(verdict) => {
                debug!(verdict, "⚖️ Evaluating feedback... {}", verdict);
                Some(verdict)
            }
            Err(e @ (EvaluationError::Incomplete | EvaluationError::NotConnected)) => {
                debug!("⚖️ Evaluating feedback... indeterminate, {}", e);
                None
            }
            Err(e) => {
                warn!("⚠️ Evaluating feedback... indeterminate, {}", e);
                None
            }
        }
    }

    pub async fn try_evaluate(&self, request: &FeedbackRequest) -> Result<bool, EvaluationError> {
        match request {
            FeedbackRequest::TimelineState {
                timeline: Some(num),
                state: Some(state),
            } => {
                let timelines = self.client().await?.timelines().await?;
                let timeline = find_selected(&timelines, *num, DeviceKind::Timeline)?;
                Ok(timeline.state == *state)
            }
            FeedbackRequest::SceneState {
                scene: Some(num),
                state: Some(state),
            } => {
                let scenes = self.client().await?.scenes().await?;
                let scene = find_selected(&scenes, *num, DeviceKind::Scene)?;
                Ok(scene.state == *state)
            }
            FeedbackRequest::GroupState {
                group: Some(num),
                operation: Some(operation),
                level: Some(level),
            } => {
                let groups = self.client().await?.groups().await?;
                let group = find_selected(&groups, *num, DeviceKind::Group)?;
                Ok(operation.holds(group.level, *level))
            }
            _ => Err(EvaluationError::Incomplete),
        }
    }

    async fn client(&self) -> Result<Arc<dyn DeviceClient>, EvaluationError> {
        self.supervisor.client().await.ok_or(EvaluationError::NotConnected)
    }
}

fn find_selected<T: InventoryItem>(records: &[T], num: u32, kind: DeviceKind) -> Result<&T, EvaluationError> {
    records
        .iter()
        .find(|record| record.num() == Some(num))
        .ok_or(EvaluationError::SelectionMismatch { kind, num })
}

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("not all options are selected")]
    Incomplete,
    #[error("not connected to a controller")]
    NotConnected,
    #[error("entry {num} is no longer among the controller's {kind}")]
    SelectionMismatch { kind: DeviceKind, num: u32 },
    #[error("querying the controller failed: {0}")]
    Query(#[from] DeviceClientError),
}
