use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::adapters::weatherxm::{ApiError, StationApi};
use crate::domain::models::{
    DailyForecast, Device, DeviceAttributes, Firmware, ForecastDay, HourlyForecast, Location,
    Rewards, WeatherReading,
};

pub fn sample_device(id: &str, relation: &str) -> Device {
    Device {
        id: id.to_string(),
        name: format!("Station {id}"),
        attributes: DeviceAttributes {
            friendly_name: None,
            is_active: Some(true),
            firmware: Some(Firmware {
                current: Some("1.0.0".to_string()),
                assigned: Some("1.1.0".to_string()),
            }),
            last_weather_station_activity: Some("2026-10-18T09:55:00Z".to_string()),
        },
        bat_state: Some("ok".to_string()),
        relation: Some(relation.to_string()),
        location: Some(Location {
            lat: Some(37.98),
            lon: Some(23.72),
        }),
        address: Some("Athens".to_string()),
        current_weather: Some(WeatherReading {
            timestamp: Some("2026-10-18T10:00:00Z".to_string()),
            temperature: Some(21.5),
            humidity: Some(60.0),
            wind_speed: Some(5.0),
            pressure: Some(1013.0),
            icon: Some("clear-day".to_string()),
            ..WeatherReading::default()
        }),
        rewards: Some(Rewards {
            actual_reward: Some(1.0),
            total_rewards: Some(100.0),
        }),
        forecast: Vec::new(),
    }
}

pub fn device_json(id: &str, relation: &str) -> Value {
    let mut value =
        serde_json::to_value(sample_device(id, relation)).expect("device should serialize");
    if let Some(object) = value.as_object_mut() {
        object.remove("forecast");
    }
    value
}

pub fn sample_forecast(days: usize, hours_per_day: usize) -> Vec<ForecastDay> {
    (0..days)
        .map(|day| ForecastDay {
            tz: Some("Europe/Athens".to_string()),
            date: Some(format!("day-{day}")),
            daily: Some(DailyForecast {
                timestamp: Some(format!("day-{day}")),
                temperature_max: Some(24.0 + day as f64),
                temperature_min: Some(14.0 + day as f64),
                precipitation_intensity: Some(0.2),
                precipitation_probability: Some(30.0),
                wind_speed: Some(8.0),
                wind_direction: Some(180.0),
                icon: Some("rain".to_string()),
            }),
            hourly: (0..hours_per_day)
                .map(|hour| HourlyForecast {
                    timestamp: Some(format!("day-{day}-hour-{hour}")),
                    temperature: Some(18.0),
                    icon: Some("partly-cloudy-day".to_string()),
                    ..HourlyForecast::default()
                })
                .collect(),
        })
        .collect()
}

type ForecastHook = Box<dyn Fn(&str) + Send + Sync>;

pub struct FakeStationApi {
    authenticated: AtomicBool,
    accept_login: AtomicBool,
    devices: Mutex<Result<Vec<Device>, u16>>,
    forecasts: Mutex<HashMap<String, Vec<ForecastDay>>>,
    on_forecast: Mutex<Option<ForecastHook>>,
    pub login_calls: AtomicUsize,
    pub device_calls: AtomicUsize,
    pub forecast_calls: AtomicUsize,
}

impl FakeStationApi {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            authenticated: AtomicBool::new(true),
            accept_login: AtomicBool::new(true),
            devices: Mutex::new(Ok(devices)),
            forecasts: Mutex::new(HashMap::new()),
            on_forecast: Mutex::new(None),
            login_calls: AtomicUsize::new(0),
            device_calls: AtomicUsize::new(0),
            forecast_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_forecast(self, device_id: &str, forecast: Vec<ForecastDay>) -> Self {
        lock(&self.forecasts).insert(device_id.to_string(), forecast);
        self
    }

    pub fn set_devices(&self, devices: Vec<Device>) {
        *lock(&self.devices) = Ok(devices);
    }

    pub fn fail_devices(&self, status: u16) {
        *lock(&self.devices) = Err(status);
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }

    pub fn reject_login(&self) {
        self.accept_login.store(false, Ordering::SeqCst);
    }

    pub fn on_forecast(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        *lock(&self.on_forecast) = Some(Box::new(hook));
    }
}

#[async_trait]
impl StationApi for FakeStationApi {
    async fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn authenticate(&self, _username: &str, _password: &str) -> Result<(), ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        if self.accept_login.load(Ordering::SeqCst) {
            self.authenticated.store(true, Ordering::SeqCst);
            Ok(())
        } else {
            Err(ApiError::authentication("auth/login returned status 401"))
        }
    }

    async fn get_devices(&self) -> Result<Vec<Device>, ApiError> {
        self.device_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.devices)
            .clone()
            .map_err(|status| ApiError::Request {
                status,
                body: "devices unavailable".to_string(),
            })
    }

    async fn get_forecast(&self, device_id: &str) -> Result<Vec<ForecastDay>, ApiError> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = lock(&self.on_forecast).as_ref() {
            hook(device_id);
        }
        lock(&self.forecasts)
            .get(device_id)
            .cloned()
            .ok_or_else(|| ApiError::Request {
                status: 500,
                body: format!("no forecast for {device_id}"),
            })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
