use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use thiserror::Error;

use crate::adapters::weatherxm::{ApiError, Credentials, StationApi};
use crate::domain::models::Device;
use crate::domain::snapshot::{Snapshot, SnapshotStore};

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("failed to re-authenticate: {0}")]
    Authentication(#[source] ApiError),
    #[error("failed to fetch devices: {0}")]
    Devices(#[source] ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub device_count: usize,
    pub degraded_forecasts: Vec<String>,
}

pub struct Coordinator<A> {
    api: A,
    credentials: Credentials,
    store: SnapshotStore,
}

impl<A> Coordinator<A>
where
    A: StationApi,
{
    pub fn new(api: A, credentials: Credentials, store: SnapshotStore) -> Self {
        Self {
            api,
            credentials,
            store,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn into_api(self) -> A {
        self.api
    }

    /// Runs one full cycle. On error nothing is published and the previous snapshot stays
    /// current.
    pub async fn refresh(&self) -> Result<CycleReport, CycleError> {
        if !self.api.is_authenticated().await {
            tracing::info!(
                username = %self.credentials.username,
                "no active WeatherXM session; logging in"
            );
            self.api
                .authenticate(&self.credentials.username, &self.credentials.password)
                .await
                .map_err(CycleError::Authentication)?;
        }

        let devices = self.api.get_devices().await.map_err(CycleError::Devices)?;
        tracing::debug!(device_count = devices.len(), "fetched device list");

        let assembled = join_all(
            devices
                .into_iter()
                .map(|device| self.attach_forecast(device)),
        )
        .await;

        let mut degraded_forecasts = Vec::new();
        let mut devices = Vec::with_capacity(assembled.len());
        for (device, forecast_loaded) in assembled {
            if !forecast_loaded {
                degraded_forecasts.push(device.id.clone());
            }
            devices.push(device);
        }

        let snapshot = self.store.publish(Snapshot::new(devices, Utc::now()));
        let report = CycleReport {
            device_count: snapshot.len(),
            degraded_forecasts,
        };

        tracing::debug!(
            device_count = report.device_count,
            degraded_forecasts = report.degraded_forecasts.len(),
            fetched_at = %snapshot.fetched_at(),
            "snapshot published"
        );

        Ok(report)
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.store.current()
    }

    async fn attach_forecast(&self, mut device: Device) -> (Device, bool) {
        match self.api.get_forecast(&device.id).await {
            Ok(forecast) => {
                tracing::trace!(
                    device_id = %device.id,
                    days = forecast.len(),
                    "forecast attached"
                );
                device.forecast = forecast;
                (device, true)
            }
            Err(error) => {
                tracing::warn!(
                    device_id = %device.id,
                    error = %error,
                    "forecast fetch failed; publishing device without forecast"
                );
                device.forecast = Vec::new();
                (device, false)
            }
        }
    }
}
