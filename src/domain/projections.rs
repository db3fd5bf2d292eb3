use serde::Serialize;

use crate::domain::conditions::{UNKNOWN_CONDITION, condition_for, condition_for_icon};
use crate::domain::models::{Device, WeatherReading};

pub const DAILY_FORECAST_LIMIT: usize = 7;
pub const HOURLY_FORECAST_LIMIT: usize = 24;
pub const REWARD_UNIT: &str = "WXM";
pub const LOCATION_SOURCE: &str = "weatherxm";

const BATTERY_OK_PERCENT: f64 = 100.0;
const BATTERY_LOW_PERCENT: f64 = 3.0;
const BATTERY_OFF_PERCENT: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSummary {
    pub id: String,
    pub alias: String,
    pub relation: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryProjection {
    pub level_percent: f64,
    pub battery_state: Option<String>,
    pub is_active: bool,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsProjection {
    pub actual_reward: Option<f64>,
    pub total_rewards: Option<f64>,
    pub unit: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmwareProjection {
    pub current: Option<String>,
    pub assigned: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorsProjection {
    pub id: String,
    pub alias: String,
    pub battery: BatteryProjection,
    pub rewards: RewardsProjection,
    pub firmware: FirmwareProjection,
    pub last_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationProjection {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source: &'static str,
    pub last_activity: Option<String>,
    pub current_weather: Option<WeatherReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecastProjection {
    pub datetime: Option<String>,
    pub temperature: Option<f64>,
    pub templow: Option<f64>,
    pub precipitation: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_bearing: Option<f64>,
    pub condition: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyForecastProjection {
    pub datetime: Option<String>,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_bearing: Option<f64>,
    pub condition: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherProjection {
    pub name: String,
    pub attribution: String,
    pub condition: Option<&'static str>,
    pub current: Option<WeatherReading>,
    pub daily: Vec<DailyForecastProjection>,
    pub hourly: Vec<HourlyForecastProjection>,
}

pub fn summary(device: &Device) -> StationSummary {
    StationSummary {
        id: device.id.clone(),
        alias: device.alias().to_string(),
        relation: device.relation.clone(),
        is_active: device.is_active(),
    }
}

pub fn battery(device: &Device) -> BatteryProjection {
    let is_active = device.is_active();
    let battery_state = device.bat_state.clone();

    let level_percent = if is_active {
        match battery_state.as_deref() {
            Some("ok") => BATTERY_OK_PERCENT,
            Some("low") => BATTERY_LOW_PERCENT,
            _ => BATTERY_OFF_PERCENT,
        }
    } else {
        BATTERY_OFF_PERCENT
    };

    let icon = if is_active && battery_state.as_deref() == Some("ok") {
        "battery"
    } else {
        "battery-alert"
    };

    BatteryProjection {
        level_percent,
        battery_state,
        is_active,
        icon,
    }
}

pub fn rewards(device: &Device) -> RewardsProjection {
    let rewards = device.rewards.unwrap_or_default();
    RewardsProjection {
        actual_reward: rewards.actual_reward,
        total_rewards: rewards.total_rewards,
        unit: REWARD_UNIT,
    }
}

pub fn firmware(device: &Device) -> FirmwareProjection {
    let firmware = device.attributes.firmware.clone().unwrap_or_default();
    FirmwareProjection {
        current: firmware.current,
        assigned: firmware.assigned,
    }
}

pub fn last_update(device: &Device) -> Option<String> {
    device
        .current_weather
        .as_ref()
        .and_then(|weather| weather.timestamp.clone())
}

pub fn sensors(device: &Device) -> SensorsProjection {
    SensorsProjection {
        id: device.id.clone(),
        alias: device.alias().to_string(),
        battery: battery(device),
        rewards: rewards(device),
        firmware: firmware(device),
        last_update: last_update(device),
    }
}

pub fn location(device: &Device) -> LocationProjection {
    let coordinates = device.location.unwrap_or_default();
    LocationProjection {
        name: format!("{} Location", device.alias()),
        latitude: coordinates.lat,
        longitude: coordinates.lon,
        source: LOCATION_SOURCE,
        last_activity: device.attributes.last_weather_station_activity.clone(),
        current_weather: device.current_weather.clone(),
    }
}

pub fn weather(device: &Device) -> WeatherProjection {
    let name = match device.address.as_deref().filter(|value| !value.is_empty()) {
        Some(address) => format!("{}, {address}", device.alias()),
        None => device.alias().to_string(),
    };

    WeatherProjection {
        name,
        attribution: format!("Data provided by WeatherXM (device {})", device.id),
        condition: device
            .current_weather
            .as_ref()
            .and_then(|weather| condition_for(weather.icon.as_deref())),
        current: device.current_weather.clone(),
        daily: daily_forecast(device),
        hourly: hourly_forecast(device),
    }
}

pub fn daily_forecast(device: &Device) -> Vec<DailyForecastProjection> {
    device
        .forecast
        .iter()
        .take(DAILY_FORECAST_LIMIT)
        .map(|day| {
            let daily = day.daily.clone().unwrap_or_default();
            DailyForecastProjection {
                datetime: daily.timestamp,
                temperature: daily.temperature_max,
                templow: daily.temperature_min,
                precipitation: daily.precipitation_intensity,
                precipitation_probability: daily.precipitation_probability,
                wind_speed: daily.wind_speed,
                wind_bearing: daily.wind_direction,
                condition: icon_condition(daily.icon.as_deref()),
            }
        })
        .collect()
}

pub fn hourly_forecast(device: &Device) -> Vec<HourlyForecastProjection> {
    device
        .forecast
        .iter()
        .flat_map(|day| day.hourly.iter())
        .take(HOURLY_FORECAST_LIMIT)
        .map(|hour| HourlyForecastProjection {
            datetime: hour.timestamp.clone(),
            temperature: hour.temperature,
            precipitation: hour.precipitation,
            precipitation_probability: hour.precipitation_probability,
            wind_speed: hour.wind_speed,
            wind_bearing: hour.wind_direction,
            condition: icon_condition(hour.icon.as_deref()),
        })
        .collect()
}

fn icon_condition(icon: Option<&str>) -> &'static str {
    icon.map(condition_for_icon).unwrap_or(UNKNOWN_CONDITION)
}
