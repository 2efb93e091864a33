pub mod commands;
pub mod device;
pub mod feedback;
mod inventory_entry;
mod selection_deserializer;
pub mod session;

pub use device::{DeviceKind, Group, Scene, SceneState, Timeline, TimelineState};
pub use inventory_entry::{InventoryEntry, InventoryItem};
