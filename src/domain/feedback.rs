use crate::domain::device::{SceneState, TimelineState};
use crate::domain::selection_deserializer::{blank_as_none, selection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedbackKind {
    TimelineState,
    SceneState,
    GroupState,
}

impl FeedbackKind {
    pub fn id(&self) -> &'static str {
        match self {
            FeedbackKind::TimelineState => "timelineState",
            FeedbackKind::SceneState => "sceneState",
            FeedbackKind::GroupState => "groupState",
        }
    }
}

impl Display for FeedbackKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    More,
    Less,
    Equal,
}

impl Comparison {
    pub fn all() -> [Comparison; 3] {
        [Comparison::More, Comparison::Less, Comparison::Equal]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::More => "more",
            Comparison::Less => "less",
            Comparison::Equal => "equal",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::More => ">",
            Comparison::Less => "<",
            Comparison::Equal => "=",
        }
    }

    /// Compares a live value against the configured target.
    pub fn holds(&self, live: f64, target: f64) -> bool {
        match self {
            Comparison::More => live > target,
            Comparison::Less => live < target,
            Comparison::Equal => live == target,
        }
    }
}

/// The options a user configured on a single button. Every field is optional because
/// the host hands over whatever the user selected so far.
#[derive(PartialEq, Debug, Clone)]
pub enum FeedbackRequest {
    TimelineState {
        timeline: Option<u32>,
        state: Option<TimelineState>,
    },
    SceneState {
        scene: Option<u32>,
        state: Option<SceneState>,
    },
    GroupState {
        group: Option<u32>,
        operation: Option<Comparison>,
        level: Option<f64>,
    },
}

#[derive(Deserialize)]
struct TimelineStateOptions {
    #[serde(default, deserialize_with = "selection")]
    timeline: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    state: Option<TimelineState>,
}

#[derive(Deserialize)]
struct SceneStateOptions {
    #[serde(default, deserialize_with = "selection")]
    scene: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    state: Option<SceneState>,
}

#[derive(Deserialize)]
struct GroupStateOptions {
    #[serde(default, deserialize_with = "selection")]
    group: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    operation: Option<Comparison>,
    #[serde(default, deserialize_with = "blank_as_none")]
    level: Option<f64>,
}

impl FeedbackRequest {
    pub fn from_options(kind: FeedbackKind, options: Value) -> Result<Self, FeedbackOptionsError> {
        let request = match kind {
            FeedbackKind::TimelineState => {
                let options: TimelineStateOptions = serde_json::from_value(options)?;
                if options.state == Some(TimelineState::Unknown) {
                    return Err(FeedbackOptionsError::UnsupportedState(kind));
                }
                FeedbackRequest::TimelineState {
                    timeline: options.timeline,
                    state: options.state,
                }
            }
            FeedbackKind::SceneState => {
                let options: SceneStateOptions = serde_json::from_value(options)?;
                if options.state == Some(SceneState::Unknown) {
                    return Err(FeedbackOptionsError::UnsupportedState(kind));
                }
                FeedbackRequest::SceneState {
                    scene: options.scene,
                    state: options.state,
                }
            }
            FeedbackKind::GroupState => {
                let options: GroupStateOptions = serde_json::from_value(options)?;
                FeedbackRequest::GroupState {
                    group: options.group,
                    operation: options.operation,
                    level: options.level,
                }
            }
        };
        Ok(request)
    }

    pub fn kind(&self) -> FeedbackKind {
        match self {
            FeedbackRequest::TimelineState { .. } => FeedbackKind::TimelineState,
            FeedbackRequest::SceneState { .. } => FeedbackKind::SceneState,
            FeedbackRequest::GroupState { .. } => FeedbackKind::GroupState,
        }
    }
}

#[derive(Error, Debug)]
pub enum FeedbackOptionsError {
    #[error("invalid feedback options: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error("unsupported state selected for {0}")]
    UnsupportedState(FeedbackKind),
}
