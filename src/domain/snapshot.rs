use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::domain::models::Device;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    devices: Vec<Device>,
    index: HashMap<String, usize>,
    fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(devices: Vec<Device>, fetched_at: DateTime<Utc>) -> Self {
        let mut index = HashMap::with_capacity(devices.len());
        for (position, device) in devices.iter().enumerate() {
            // first occurrence wins if the API ever repeats an id
            index.entry(device.id.clone()).or_insert(position);
        }

        Self {
            devices,
            index,
            fetched_at,
        }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.index
            .get(id)
            .and_then(|position| self.devices.get(*position))
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn visible_devices(&self, owned_only: bool) -> impl Iterator<Item = &Device> {
        self.devices
            .iter()
            .filter(move |device| !owned_only || device.is_owned())
    }

    pub fn visible_device(&self, id: &str, owned_only: bool) -> Option<&Device> {
        self.device(id)
            .filter(|device| !owned_only || device.is_owned())
    }
}

/// Holds the last published snapshot. Publishing swaps a single `Arc`, so a reader
/// gets either the previous or the new snapshot in full.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    current: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut slot = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&snapshot));
        snapshot
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
