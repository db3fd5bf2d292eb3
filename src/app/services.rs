use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::models::Device;
use crate::domain::projections::{
    self, LocationProjection, SensorsProjection, StationSummary, WeatherProjection,
};
use crate::domain::snapshot::{Snapshot, SnapshotStore};

#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    #[error("no snapshot has been published yet")]
    NotReady,
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("poller is not running")]
    PollerStopped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationList {
    pub fetched_at: DateTime<Utc>,
    pub stations: Vec<StationSummary>,
}

pub trait StationQueryHandler {
    fn list_stations(&self) -> Result<StationList, ServiceError>;
    fn get_device(&self, id: &str) -> Result<Device, ServiceError>;
    fn get_sensors(&self, id: &str) -> Result<SensorsProjection, ServiceError>;
    fn get_weather(&self, id: &str) -> Result<WeatherProjection, ServiceError>;
    fn get_location(&self, id: &str) -> Result<LocationProjection, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct SnapshotStationService {
    store: SnapshotStore,
    owned_only: bool,
}

impl SnapshotStationService {
    pub fn new(store: SnapshotStore, owned_only: bool) -> Self {
        Self { store, owned_only }
    }

    fn snapshot(&self) -> Result<Arc<Snapshot>, ServiceError> {
        self.store.current().ok_or(ServiceError::NotReady)
    }

    fn with_device<T>(&self, id: &str, op: impl FnOnce(&Device) -> T) -> Result<T, ServiceError> {
        let snapshot = self.snapshot()?;
        snapshot
            .visible_device(id, self.owned_only)
            .map(op)
            .ok_or_else(|| ServiceError::DeviceNotFound(id.to_string()))
    }
}

impl StationQueryHandler for SnapshotStationService {
    fn list_stations(&self) -> Result<StationList, ServiceError> {
        let snapshot = self.snapshot()?;
        Ok(StationList {
            fetched_at: snapshot.fetched_at(),
            stations: snapshot
                .visible_devices(self.owned_only)
                .map(projections::summary)
                .collect(),
        })
    }

    fn get_device(&self, id: &str) -> Result<Device, ServiceError> {
        self.with_device(id, Device::clone)
    }

    fn get_sensors(&self, id: &str) -> Result<SensorsProjection, ServiceError> {
        self.with_device(id, projections::sensors)
    }

    fn get_weather(&self, id: &str) -> Result<WeatherProjection, ServiceError> {
        self.with_device(id, projections::weather)
    }

    fn get_location(&self, id: &str) -> Result<LocationProjection, ServiceError> {
        self.with_device(id, projections::location)
    }
}

#[derive(Debug, Clone)]
pub struct RefreshTrigger {
    sender: mpsc::Sender<()>,
}

impl RefreshTrigger {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    pub fn request(&self) -> Result<(), ServiceError> {
        match self.sender.try_send(()) {
            // a full queue already guarantees an upcoming cycle
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => Ok(()),
            Err(mpsc::error::TrySendError::Closed(())) => Err(ServiceError::PollerStopped),
        }
    }
}
