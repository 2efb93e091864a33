use serde::Deserialize;
use std::fmt::{Display, Formatter};

#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum DeviceKind {
    Group,
    Scene,
    Timeline,
}

impl Display for DeviceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Group => write!(f, "groups"),
            DeviceKind::Scene => write!(f, "scenes"),
            DeviceKind::Timeline => write!(f, "timelines"),
        }
    }
}

// Records as reported by the controller. `num` is optional because the controller
// lists some groups (e.g. the implicit master group) without one.
#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct Group {
    pub num: Option<u32>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub level: f64,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct Scene {
    pub num: Option<u32>,
    #[serde(default)]
    pub name: String,
    pub state: SceneState,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct Timeline {
    pub num: Option<u32>,
    #[serde(default)]
    pub name: String,
    pub state: TimelineState,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneState {
    Started,
    Released,
    #[serde(other)]
    Unknown,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineState {
    Released,
    Running,
    Paused,
    #[serde(other)]
    Unknown,
}

impl SceneState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneState::Started => "started",
            SceneState::Released => "released",
            SceneState::Unknown => "unknown",
        }
    }
}

impl TimelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineState::Released => "released",
            TimelineState::Running => "running",
            TimelineState::Paused => "paused",
            TimelineState::Unknown => "unknown",
        }
    }
}
