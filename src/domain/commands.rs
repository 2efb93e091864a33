use crate::domain::feedback::FeedbackKind;
use crate::domain::selection_deserializer::{blank_as_none, selection};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(PartialEq, Debug, Clone)]
pub enum Command {
    ControlTimeline { timeline: u32, action: TimelineAction },
    ControlScene { scene: u32, action: SceneAction },
    ControlGroup { group: u32, action: GroupAction },
}

#[derive(Deserialize)]
struct TimelineOptions {
    #[serde(default, deserialize_with = "selection")]
    timeline: Option<u32>,
    action: TimelineAction,
}

#[derive(Deserialize)]
struct SceneOptions {
    #[serde(default, deserialize_with = "selection")]
    scene: Option<u32>,
    action: SceneAction,
}

#[derive(Deserialize)]
struct GroupOptions {
    #[serde(default, deserialize_with = "selection")]
    group: Option<u32>,
    action: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    level: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    step: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    fade: Option<f64>,
}

impl GroupOptions {
    fn percentage(value: Option<f64>, field: &'static str) -> Result<f64, CommandOptionsError> {
        let value = value.ok_or(CommandOptionsError::MissingValue(field))?;
        if !(0.0..=100.0).contains(&value) {
            return Err(CommandOptionsError::OutOfRange { field, value });
        }
        Ok(value)
    }

    fn fade(&self) -> Result<f64, CommandOptionsError> {
        match self.fade {
            Some(value) if !value.is_finite() || value < 0.0 => Err(CommandOptionsError::OutOfRange { field: "fade", value }),
            Some(value) => Ok(value),
            None => Ok(0.0),
        }
    }
}

impl Command {
    /// Builds a command from the options of a button action as the host hands them over.
    pub fn from_options(action_id: &str, options: Value) -> Result<Self, CommandOptionsError> {
        match action_id {
            "controlTimeline" => {
                let options: TimelineOptions = serde_json::from_value(options)?;
                let timeline = options.timeline.ok_or(CommandOptionsError::MissingSelection("timeline"))?;
                Ok(Command::ControlTimeline { timeline, action: options.action })
            }
            "controlScene" => {
                let options: SceneOptions = serde_json::from_value(options)?;
                let scene = options.scene.ok_or(CommandOptionsError::MissingSelection("scene"))?;
                Ok(Command::ControlScene { scene, action: options.action })
            }
            "controlGroup" => {
                let options: GroupOptions = serde_json::from_value(options)?;
                let group = options.group.ok_or(CommandOptionsError::MissingSelection("group"))?;
                let action = match options.action.as_str() {
                    "level" => GroupAction::Level {
                        level: GroupOptions::percentage(options.level, "level")?,
                        fade: options.fade()?,
                    },
                    "raise" => GroupAction::Raise {
                        step: GroupOptions::percentage(options.step, "step")?,
                        fade: options.fade()?,
                    },
                    "lower" => GroupAction::Lower {
                        step: GroupOptions::percentage(options.step, "step")?,
                        fade: options.fade()?,
                    },
                    other => return Err(CommandOptionsError::UnknownAction(other.to_string())),
                };
                Ok(Command::ControlGroup { group, action })
            }
            other => Err(CommandOptionsError::UnknownAction(other.to_string())),
        }
    }

    /// The feedback kind whose verdicts may change when this command is executed.
    pub fn feedback_kind(&self) -> FeedbackKind {
        match self {
            Command::ControlTimeline { .. } => FeedbackKind::TimelineState,
            Command::ControlScene { .. } => FeedbackKind::SceneState,
            Command::ControlGroup { .. } => FeedbackKind::GroupState,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Command::ControlTimeline { .. } => "controlTimeline",
            Command::ControlScene { .. } => "controlScene",
            Command::ControlGroup { .. } => "controlGroup",
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineAction {
    Start,
    Release,
    Toggle,
    Pause,
    Resume,
}

impl TimelineAction {
    pub fn all() -> [TimelineAction; 5] {
        [TimelineAction::Start, TimelineAction::Release, TimelineAction::Toggle, TimelineAction::Pause, TimelineAction::Resume]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineAction::Start => "start",
            TimelineAction::Release => "release",
            TimelineAction::Toggle => "toggle",
            TimelineAction::Pause => "pause",
            TimelineAction::Resume => "resume",
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneAction {
    Start,
    Release,
    Toggle,
}

impl SceneAction {
    pub fn all() -> [SceneAction; 3] {
        [SceneAction::Start, SceneAction::Release, SceneAction::Toggle]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SceneAction::Start => "start",
            SceneAction::Release => "release",
            SceneAction::Toggle => "toggle",
        }
    }
}

/// Group intensity changes. Levels and steps are on the 0-100 scale, fades in seconds.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum GroupAction {
    Level { level: f64, fade: f64 },
    Raise { step: f64, fade: f64 },
    Lower { step: f64, fade: f64 },
}

impl GroupAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupAction::Level { .. } => "level",
            GroupAction::Raise { .. } => "raise",
            GroupAction::Lower { .. } => "lower",
        }
    }
}

#[derive(Error, Debug)]
pub enum CommandOptionsError {
    #[error("invalid action options: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error("no {0} selected")]
    MissingSelection(&'static str),
    #[error("no {0} given")]
    MissingValue(&'static str),
    #[error("{field} {value} is outside 0-100")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("unknown action '{0}'")]
    UnknownAction(String),
}
