use crate::client::DeviceClient;
use crate::domain::{DeviceKind, InventoryEntry, InventoryItem};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// The selectable groups, scenes and timelines as of the last successful refresh.
#[derive(PartialEq, Debug, Clone)]
pub struct Inventory {
    // Session generation that is allowed to replace the lists
    generation: u64,
    groups: Arc<[InventoryEntry]>,
    scenes: Arc<[InventoryEntry]>,
    timelines: Arc<[InventoryEntry]>,
}

impl Inventory {
    pub fn empty() -> Self {
        Inventory {
            generation: 0,
            groups: Arc::from(Vec::new()),
            scenes: Arc::from(Vec::new()),
            timelines: Arc::from(Vec::new()),
        }
    }

    pub fn groups(&self) -> &[InventoryEntry] {
        &self.groups
    }

    pub fn scenes(&self) -> &[InventoryEntry] {
        &self.scenes
    }

    pub fn timelines(&self) -> &[InventoryEntry] {
        &self.timelines
    }

    pub fn entries(&self, kind: DeviceKind) -> &[InventoryEntry] {
        match kind {
            DeviceKind::Group => self.groups(),
            DeviceKind::Scene => self.scenes(),
            DeviceKind::Timeline => self.timelines(),
        }
    }
}

#[derive(PartialEq, Debug)]
pub enum RefreshOutcome {
    Replaced(Inventory),
    PartialFailure(Vec<DeviceKind>),
    /// A newer session took over while the queries were in flight.
    Discarded,
}

#[derive(Debug)]
pub struct InventoryCache {
    tx: watch::Sender<Inventory>,
}

impl InventoryCache {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Inventory::empty());
        InventoryCache { tx }
    }

    pub fn snapshot(&self) -> Inventory {
        self.tx.borrow().clone()
    }

    /// Receives every replaced inventory. All three lists change in one notification.
    pub fn subscribe(&self) -> watch::Receiver<Inventory> {
        self.tx.subscribe()
    }

    /// Only refreshes tagged with `generation` may commit from now on. Keeps the current lists.
    pub(crate) fn begin_generation(&self, generation: u64) {
        self.tx.send_if_modified(|inventory| {
            inventory.generation = generation;
            false
        });
    }

    #[instrument(skip(self, client))]
    pub async fn refresh(&self, client: &dyn DeviceClient, generation: u64) -> RefreshOutcome {
        debug!("📋 Refreshing inventory...");
        let (groups, scenes, timelines) = futures::join!(client.groups(), client.scenes(), client.timelines());

        let (groups, scenes, timelines) = match (groups, scenes, timelines) {
            (Ok(groups), Ok(scenes), Ok(timelines)) => (project(&groups), project(&scenes), project(&timelines)),
            (groups, scenes, timelines) => {
                let failed: Vec<DeviceKind> = [
                    (DeviceKind::Group, groups.err()),
                    (DeviceKind::Scene, scenes.err()),
                    (DeviceKind::Timeline, timelines.err()),
                ]
                .into_iter()
                .filter_map(|(kind, error)| {
                    let error = error?;
                    warn!(%kind, "⚠️ Querying {} failed: {}", kind, error);
                    Some(kind)
                })
                .collect();

                warn!(?failed, "📋 Refreshing inventory... failed, keeping the previous inventory");
                return RefreshOutcome::PartialFailure(failed);
            }
        };

        let inventory = Inventory {
            generation,
            groups,
            scenes,
            timelines,
        };

        let committed = self.tx.send_if_modified(|current| {
            if current.generation != generation {
                return false;
            }
            *current = inventory.clone();
            true
        });

        if !committed {
            debug!("📋 Refreshing inventory... discarded, superseded by a newer session");
            return RefreshOutcome::Discarded;
        }

        info!(
            "📋 Refreshing inventory... OK, {} group(s), {} scene(s), {} timeline(s)",
            inventory.groups.len(),
            inventory.scenes.len(),
            inventory.timelines.len()
        );
        RefreshOutcome::Replaced(inventory)
    }
}

impl Default for InventoryCache {
    fn default() -> Self {
        InventoryCache::new()
    }
}

fn project<T: InventoryItem>(records: &[T]) -> Arc<[InventoryEntry]> {
    records.iter().filter_map(InventoryItem::to_entry).collect()
}
