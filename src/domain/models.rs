use serde::{Deserialize, Serialize};

pub const OWNED_RELATION: &str = "owned";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attributes: DeviceAttributes,
    #[serde(default)]
    pub bat_state: Option<String>,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub current_weather: Option<WeatherReading>,
    #[serde(default)]
    pub rewards: Option<Rewards>,
    #[serde(default)]
    pub forecast: Vec<ForecastDay>,
}

impl Device {
    pub fn alias(&self) -> &str {
        self.attributes
            .friendly_name
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(self.name.as_str())
    }

    pub fn is_owned(&self) -> bool {
        self.relation.as_deref() == Some(OWNED_RELATION)
    }

    pub fn is_active(&self) -> bool {
        self.attributes.is_active.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceAttributes {
    pub friendly_name: Option<String>,
    pub is_active: Option<bool>,
    pub firmware: Option<Firmware>,
    pub last_weather_station_activity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Firmware {
    pub current: Option<String>,
    pub assigned: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    pub actual_reward: Option<f64>,
    pub total_rewards: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherReading {
    pub timestamp: Option<String>,
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub dew_point: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wind_direction: Option<f64>,
    pub pressure: Option<f64>,
    pub precipitation: Option<f64>,
    pub precipitation_accumulated: Option<f64>,
    pub uv_index: Option<f64>,
    pub solar_irradiance: Option<f64>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastDay {
    pub tz: Option<String>,
    pub date: Option<String>,
    pub daily: Option<DailyForecast>,
    pub hourly: Vec<HourlyForecast>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyForecast {
    pub timestamp: Option<String>,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub precipitation_intensity: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyForecast {
    pub timestamp: Option<String>,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub icon: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Device;

    #[test]
    fn decodes_device_record_from_api_payload() {
        let payload = json!({
            "id": "dev-1",
            "name": "Crimson Quiet Breeze",
            "attributes": {
                "friendlyName": "Garden",
                "isActive": true,
                "firmware": { "current": "1.2.0", "assigned": "1.3.0" },
                "lastWeatherStationActivity": "2026-10-18T10:00:00Z",
                "hex7": "unused"
            },
            "bat_state": "ok",
            "relation": "owned",
            "location": { "lat": 37.98, "lon": 23.72 },
            "address": "Athens",
            "current_weather": {
                "timestamp": "2026-10-18T10:00:00Z",
                "temperature": 21.5,
                "humidity": 60,
                "icon": "clear-day"
            },
            "rewards": { "actual_reward": 1.25, "total_rewards": 310.5 }
        });

        let device: Device = serde_json::from_value(payload).expect("device should decode");

        assert_eq!(device.alias(), "Garden");
        assert!(device.is_owned());
        assert!(device.is_active());
        assert_eq!(
            device.attributes.firmware.as_ref().and_then(|f| f.current.as_deref()),
            Some("1.2.0")
        );
        let weather = device.current_weather.expect("current weather expected");
        assert_eq!(weather.humidity, Some(60.0));
        assert_eq!(weather.icon.as_deref(), Some("clear-day"));
        assert!(device.forecast.is_empty());
    }

    #[test]
    fn falls_back_to_name_and_inactive_when_attributes_missing() {
        let device: Device = serde_json::from_value(json!({
            "id": "dev-2",
            "name": "Silent Storm",
            "attributes": { "friendlyName": "  " },
            "relation": "followed"
        }))
        .expect("device should decode");

        assert_eq!(device.alias(), "Silent Storm");
        assert!(!device.is_owned());
        assert!(!device.is_active());
        assert_eq!(device.current_weather, None);
    }

    #[test]
    fn rejects_device_without_id() {
        let result = serde_json::from_value::<Device>(json!({ "name": "orphan" }));
        assert!(result.is_err());
    }
}
