use crate::domain::device::{Group, Scene, Timeline};
use serde::Serialize;

/// A selectable `{id, label}` option derived from a device record.
#[derive(PartialEq, Eq, Debug, Clone, Serialize)]
pub struct InventoryEntry {
    pub id: u32,
    pub label: String,
}

/// Device records that can be listed as inventory options.
pub trait InventoryItem {
    fn num(&self) -> Option<u32>;
    fn name(&self) -> &str;

    /// Projects the record into an option, or `None` when the record has no identity.
    fn to_entry(&self) -> Option<InventoryEntry> {
        self.num().map(|id| InventoryEntry {
            id,
            label: self.name().to_owned(),
        })
    }
}

macro_rules! impl_inventory_item {
    ($($t:ident)*) => ($(
        impl InventoryItem for $t {
            fn num(&self) -> Option<u32> {
                self.num
            }

            fn name(&self) -> &str {
                &self.name
            }
        }
    )*)
}

impl_inventory_item! { Group Scene Timeline }
