pub const UNKNOWN_CONDITION: &str = "unknown";

pub fn condition_for_icon(icon: &str) -> &'static str {
    match icon {
        "clear-day" | "clear" | "hot-day" | "hot" | "mostly-sunny" | "sunny" => "sunny",
        "clear-night" | "cold-night" | "hot-night" => "clear-night",
        "blizzard" | "cold-day" | "cold" | "flurries" | "snow-showers" | "snow" => "snowy",
        "cloudy" | "mostlycloudy" | "overcast" => "cloudy",
        "partly-cloudy-day" | "partly-cloudy-night" | "partlycloudy" => "partlycloudy",
        "drizzle" | "isolated-showers" | "rain-showers" | "rain" | "scattered-showers" => {
            "rainy"
        }
        "dust-day" | "dust-night" | "dust" | "fog" | "haze" | "mist" | "sand"
        | "sandstorm-day" | "sandstorm-night" | "smoke" | "volcanic-ash" => "fog",
        "freezing-drizzle" | "freezing-rain" | "rain-and-sleet" | "rain-and-snow" | "sleet"
        | "snow-thunderstorm" | "thunderstorm-with-snow" => "snowy-rainy",
        "hail" | "hailstorm" | "thunderstorm-with-hail" => "hail",
        "isolated-thunderstorms" | "scattered-thunderstorms" | "thunderstorm"
        | "thunderstorms" => "lightning",
        "thunderstorm-with-rain" => "lightning-rainy",
        "hurricane" => "exceptional",
        "tornado" => "tornado",
        "wind" => "windy",
        "windy-variant" => "windy-variant",
        _ => UNKNOWN_CONDITION,
    }
}

pub fn condition_for(icon: Option<&str>) -> Option<&'static str> {
    icon.map(condition_for_icon)
}
