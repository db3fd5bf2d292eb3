use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use tokio::sync::{mpsc, watch};

use crate::adapters::api::{ApiState, configure_routes};
use crate::adapters::weatherxm::{StationApi, WeatherXmClient};
use crate::app::config::AppConfig;
use crate::app::coordinator::{Coordinator, CycleReport};
use crate::app::error::AppError;
use crate::app::services::{RefreshTrigger, SnapshotStationService};
use crate::app::status_report::format_station_status;
use crate::domain::snapshot::SnapshotStore;

const REFRESH_QUEUE_CAPACITY: usize = 1;

pub async fn setup(
    config: &AppConfig,
) -> Result<(Coordinator<WeatherXmClient>, CycleReport), AppError> {
    let client = WeatherXmClient::new(
        &config.host,
        Duration::from_secs(config.request_timeout_secs),
    )
    .map_err(AppError::setup)?;

    let credentials = config.credentials();
    client
        .authenticate(&credentials.username, &credentials.password)
        .await
        .map_err(AppError::setup)?;

    let coordinator = Coordinator::new(client, credentials, SnapshotStore::new());
    let report = coordinator.refresh().await.map_err(AppError::setup)?;

    tracing::info!(
        device_count = report.device_count,
        degraded_forecasts = report.degraded_forecasts.len(),
        "initial snapshot published"
    );

    Ok((coordinator, report))
}

pub async fn run_poller<A>(
    coordinator: Coordinator<A>,
    poll_interval: Duration,
    mut refresh_requests: mpsc::Receiver<()>,
    mut stop: watch::Receiver<bool>,
) -> Coordinator<A>
where
    A: StationApi,
{
    let mut refresh_open = true;

    loop {
        if *stop.borrow() {
            break;
        }

        tokio::select! {
            changed = stop.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            request = refresh_requests.recv(), if refresh_open => {
                if request.is_none() {
                    refresh_open = false;
                    continue;
                }
                tracing::info!("on-demand refresh requested");
            }
            _ = tokio::time::sleep(poll_interval) => {}
        }

        match coordinator.refresh().await {
            Ok(report) => tracing::info!(
                device_count = report.device_count,
                degraded_forecasts = report.degraded_forecasts.len(),
                "poll cycle completed"
            ),
            Err(error) => {
                tracing::warn!(error = %error, "poll cycle failed; keeping last known snapshot")
            }
        }
    }

    tracing::info!("poll loop stopped");
    coordinator
}

pub fn run(config: AppConfig) -> Result<(), AppError> {
    actix_web::rt::System::new().block_on(async move {
        let (coordinator, _) = setup(&config).await?;

        let (refresh, refresh_requests) = RefreshTrigger::channel(REFRESH_QUEUE_CAPACITY);
        let api_state = ApiState {
            station_queries: SnapshotStationService::new(
                coordinator.store().clone(),
                config.owned_only,
            ),
            refresh,
        };

        let (stop_tx, stop_rx) = watch::channel(false);
        let poller = actix_web::rt::spawn(run_poller(
            coordinator,
            Duration::from_secs(config.poll_interval_secs),
            refresh_requests,
            stop_rx,
        ));

        tracing::info!(bind = %config.http_bind, "http server starting");

        let server_result = match HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .app_data(web::Data::new(api_state.clone()))
                .configure(configure_routes)
        })
        .bind(&config.http_bind)
        {
            Ok(server) => server.run().await,
            Err(error) => Err(error),
        };

        if stop_tx.send(true).is_err() {
            tracing::debug!("poll loop already gone before shutdown");
        }
        let coordinator = poller
            .await
            .map_err(|_| AppError::runtime("poll loop panicked"))?;
        let client = coordinator.into_api();
        client.close().await;
        drop(client);

        server_result.map_err(AppError::runtime)
    })
}

pub fn run_once(config: AppConfig) -> Result<(), AppError> {
    actix_web::rt::System::new().block_on(async move {
        let (coordinator, report) = setup(&config).await?;

        let snapshot = coordinator
            .current()
            .ok_or_else(|| AppError::runtime("no snapshot after initial fetch"))?;

        println!(
            "WeatherXM status at {} ({} stations fetched)",
            snapshot.fetched_at().format("%Y-%m-%d %H:%M:%S UTC"),
            snapshot.len()
        );
        for device in snapshot.visible_devices(config.owned_only) {
            println!("{}", format_station_status(device));
        }
        if !report.degraded_forecasts.is_empty() {
            println!(
                "forecast unavailable for: {}",
                report.degraded_forecasts.join(", ")
            );
        }

        coordinator.into_api().close().await;
        Ok(())
    })
}
