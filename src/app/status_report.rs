use crate::domain::conditions::condition_for;
use crate::domain::models::Device;
use crate::domain::projections;

const MISSING: &str = "-";

pub fn format_station_status(device: &Device) -> String {
    let battery = projections::battery(device);
    let rewards = projections::rewards(device);
    let weather = device.current_weather.as_ref();

    let condition = weather
        .and_then(|reading| condition_for(reading.icon.as_deref()))
        .unwrap_or(MISSING);
    let temperature = weather
        .and_then(|reading| reading.temperature)
        .map(|value| format!("{value:.1}°C"))
        .unwrap_or_else(|| MISSING.to_string());
    let total_rewards = rewards
        .total_rewards
        .map(|value| format!("{value:.2} {}", rewards.unit))
        .unwrap_or_else(|| MISSING.to_string());
    let last_update = projections::last_update(device).unwrap_or_else(|| MISSING.to_string());

    format!(
        "{alias} [{id}] {state} | {condition} {temperature} | battery {level:.0}% ({battery_state}) | rewards {total_rewards} | last update {last_update}",
        alias = device.alias(),
        id = device.id,
        state = if battery.is_active { "active" } else { "inactive" },
        level = battery.level_percent,
        battery_state = battery.battery_state.as_deref().unwrap_or(MISSING),
    )
}

#[cfg(test)]
mod tests {
    use crate::test_support::sample_device;

    use super::format_station_status;

    #[test]
    fn formats_active_station_with_reading() {
        let device = sample_device("a", "owned");

        assert_eq!(
            format_station_status(&device),
            "Station a [a] active | sunny 21.5°C | battery 100% (ok) | rewards 100.00 WXM | last update 2026-10-18T10:00:00Z"
        );
    }

    #[test]
    fn formats_station_without_reading_or_rewards() {
        let mut device = sample_device("b", "owned");
        device.attributes.is_active = Some(false);
        device.current_weather = None;
        device.rewards = None;
        device.bat_state = None;

        assert_eq!(
            format_station_status(&device),
            "Station b [b] inactive | - - | battery 0% (-) | rewards - | last update -"
        );
    }
}
