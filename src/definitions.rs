use crate::domain::commands::{SceneAction, TimelineAction};
use crate::domain::feedback::{Comparison, FeedbackKind};
use crate::domain::{InventoryEntry, SceneState, TimelineState};
use crate::inventory::Inventory;
use serde::Serialize;
use serde_json::Value;

pub const COLOR_GREEN: u32 = combine_rgb(0, 200, 0);

/// Packs an RGB triple the way the host expects colors, `0xRRGGBB`.
pub const fn combine_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Choice {
    pub id: Value,
    pub label: String,
}

impl Choice {
    fn new(id: impl Into<Value>, label: impl Into<String>) -> Self {
        Choice { id: id.into(), label: label.into() }
    }
}

impl From<&InventoryEntry> for Choice {
    fn from(entry: &InventoryEntry) -> Self {
        Choice::new(entry.id, entry.label.clone())
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptionField {
    Dropdown {
        id: &'static str,
        label: &'static str,
        choices: Vec<Choice>,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
        required: bool,
    },
    Number {
        id: &'static str,
        label: &'static str,
        min: f64,
        max: f64,
        default: f64,
        required: bool,
    },
}

impl OptionField {
    fn inventory(id: &'static str, label: &'static str, entries: &[InventoryEntry]) -> Self {
        OptionField::Dropdown {
            id,
            label,
            choices: entries.iter().map(Choice::from).collect(),
            default: None,
            required: true,
        }
    }

    fn choice(id: &'static str, label: &'static str, choices: Vec<Choice>, default: &'static str) -> Self {
        OptionField::Dropdown {
            id,
            label,
            choices,
            default: Some(Value::from(default)),
            required: true,
        }
    }

    fn number(id: &'static str, label: &'static str, max: f64, default: f64) -> Self {
        OptionField::Number {
            id,
            label,
            min: 0.0,
            max,
            default,
            required: true,
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Style {
    pub bgcolor: u32,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ActionDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub options: Vec<OptionField>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDefinition {
    pub id: FeedbackKind,
    #[serde(rename = "type")]
    pub feedback_type: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub default_style: Style,
    pub options: Vec<OptionField>,
}

pub fn action_definitions(inventory: &Inventory) -> Vec<ActionDefinition> {
    vec![
        ActionDefinition {
            id: "controlTimeline",
            name: "Control timeline",
            options: vec![
                OptionField::inventory("timeline", "Timeline", inventory.timelines()),
                OptionField::choice(
                    "action",
                    "Action",
                    TimelineAction::all().iter().map(|action| Choice::new(action.as_str(), capitalize(action.as_str()))).collect(),
                    TimelineAction::Start.as_str(),
                ),
            ],
        },
        ActionDefinition {
            id: "controlScene",
            name: "Control scene",
            options: vec![
                OptionField::inventory("scene", "Scene", inventory.scenes()),
                OptionField::choice(
                    "action",
                    "Action",
                    SceneAction::all().iter().map(|action| Choice::new(action.as_str(), capitalize(action.as_str()))).collect(),
                    SceneAction::Start.as_str(),
                ),
            ],
        },
        ActionDefinition {
            id: "controlGroup",
            name: "Control group",
            options: vec![
                OptionField::inventory("group", "Group", inventory.groups()),
                OptionField::choice(
                    "action",
                    "Action",
                    vec![Choice::new("level", "Set level"), Choice::new("raise", "Raise"), Choice::new("lower", "Lower")],
                    "level",
                ),
                OptionField::number("level", "Level", 100.0, 100.0),
                OptionField::number("step", "Step", 100.0, 10.0),
                OptionField::number("fade", "Fade (s)", 600.0, 0.0),
            ],
        },
    ]
}

pub fn feedback_definitions(inventory: &Inventory) -> Vec<FeedbackDefinition> {
    let default_style = Style { bgcolor: COLOR_GREEN };

    vec![
        FeedbackDefinition {
            id: FeedbackKind::TimelineState,
            feedback_type: "boolean",
            name: "Change background color by state of timeline",
            description: "If the selected timeline has the selected state, change the background color of the button.",
            default_style: default_style.clone(),
            options: vec![
                OptionField::inventory("timeline", "Timeline", inventory.timelines()),
                OptionField::choice(
                    "state",
                    "State",
                    [TimelineState::Released, TimelineState::Running, TimelineState::Paused]
                        .iter()
                        .map(|state| Choice::new(state.as_str(), capitalize(state.as_str())))
                        .collect(),
                    TimelineState::Running.as_str(),
                ),
            ],
        },
        FeedbackDefinition {
            id: FeedbackKind::SceneState,
            feedback_type: "boolean",
            name: "Change background color by state of scene",
            description: "If the selected scene has the selected state, change the background color of the button.",
            default_style: default_style.clone(),
            options: vec![
                OptionField::inventory("scene", "Scene", inventory.scenes()),
                OptionField::choice(
                    "state",
                    "State",
                    [SceneState::Started, SceneState::Released]
                        .iter()
                        .map(|state| Choice::new(state.as_str(), capitalize(state.as_str())))
                        .collect(),
                    SceneState::Started.as_str(),
                ),
            ],
        },
        FeedbackDefinition {
            id: FeedbackKind::GroupState,
            feedback_type: "boolean",
            name: "Change background color by level of group",
            description: "If the selected group has the selected brightness, change the background color of the button.",
            default_style,
            options: vec![
                OptionField::inventory("group", "Group", inventory.groups()),
                OptionField::choice(
                    "operation",
                    "Operation",
                    Comparison::all().iter().map(|comparison| Choice::new(comparison.as_str(), comparison.symbol())).collect(),
                    Comparison::Equal.as_str(),
                ),
                OptionField::number("level", "Level", 100.0, 0.0),
            ],
        },
    ]
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
