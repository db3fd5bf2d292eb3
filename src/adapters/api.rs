use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::SecondsFormat;
use serde::Serialize;

use crate::app::services::{
    RefreshTrigger, ServiceError, SnapshotStationService, StationQueryHandler,
};
use crate::domain::projections::StationSummary;

#[derive(Clone)]
pub struct ApiState {
    pub station_queries: SnapshotStationService,
    pub refresh: RefreshTrigger,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StationListResponse {
    pub fetched_at: String,
    pub devices: Vec<StationSummary>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(list_devices_endpoint)
        .service(get_device_endpoint)
        .service(get_sensors_endpoint)
        .service(get_weather_endpoint)
        .service(get_location_endpoint)
        .service(refresh_endpoint);
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[get("/devices")]
async fn list_devices_endpoint(state: web::Data<ApiState>) -> impl Responder {
    match state.station_queries.list_stations() {
        Ok(list) => HttpResponse::Ok().json(StationListResponse {
            fetched_at: list
                .fetched_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            devices: list.stations,
        }),
        Err(error) => service_error_response(error),
    }
}

#[get("/devices/{id}")]
async fn get_device_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
) -> impl Responder {
    match state.station_queries.get_device(&path) {
        Ok(device) => HttpResponse::Ok().json(device),
        Err(error) => service_error_response(error),
    }
}

#[get("/devices/{id}/sensors")]
async fn get_sensors_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
) -> impl Responder {
    match state.station_queries.get_sensors(&path) {
        Ok(sensors) => HttpResponse::Ok().json(sensors),
        Err(error) => service_error_response(error),
    }
}

#[get("/devices/{id}/weather")]
async fn get_weather_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
) -> impl Responder {
    match state.station_queries.get_weather(&path) {
        Ok(weather) => HttpResponse::Ok().json(weather),
        Err(error) => service_error_response(error),
    }
}

#[get("/devices/{id}/location")]
async fn get_location_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
) -> impl Responder {
    match state.station_queries.get_location(&path) {
        Ok(location) => HttpResponse::Ok().json(location),
        Err(error) => service_error_response(error),
    }
}

#[post("/refresh")]
async fn refresh_endpoint(state: web::Data<ApiState>) -> impl Responder {
    match state.refresh.request() {
        Ok(()) => {
            tracing::debug!("refresh requested over http");
            HttpResponse::Accepted().json(serde_json::json!({ "status": "queued" }))
        }
        Err(error) => service_error_response(error),
    }
}

fn service_error_response(error: ServiceError) -> HttpResponse {
    match error {
        ServiceError::NotReady | ServiceError::PollerStopped => {
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "error": error.to_string()
            }))
        }
        ServiceError::DeviceNotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
            "error": error.to_string()
        })),
    }
}
