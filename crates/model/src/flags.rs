//! Pure derivation of the event and weather flags.
//!
//! These functions have no hidden state: the same input always produces
//! the same flag. They run once, at normalization time.

use chrono::{Datelike, NaiveDate, Weekday};

/// Venue-name keywords that mark an event as outdoor (matched
/// case-insensitively as substrings).
const OUTDOOR_KEYWORDS: [&str; 6] = [
    "stadium",
    "park",
    "amphitheater",
    "field",
    "grounds",
    "pavilion",
];

/// WMO weather codes that rule out outdoor suitability regardless of the
/// rain probability: fog, drizzle, rain, snow, showers, thunderstorms.
const BAD_WEATHER_CODES: [u16; 17] = [
    45, 48, 51, 53, 55, 61, 63, 65, 71, 73, 75, 80, 81, 82, 95, 96, 99,
];

/// True when the date (as `YYYY-MM-DD`) falls on Friday, Saturday or
/// Sunday. Unparseable dates are weekdays.
pub fn is_weekend(date: &str) -> bool {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => matches!(d.weekday(), Weekday::Fri | Weekday::Sat | Weekday::Sun),
        Err(_) => false,
    }
}

/// True when the venue name contains one of the outdoor keywords.
pub fn is_outdoor(venue_name: &str) -> bool {
    let name = venue_name.to_lowercase();
    OUTDOOR_KEYWORDS.iter().any(|kw| name.contains(kw))
}

/// True when a day's weather is workable for an outdoor event.
pub fn is_suitable_outdoor(weather_code: u16, precipitation_chance: f64, wind_speed_mph: f64) -> bool {
    !BAD_WEATHER_CODES.contains(&weather_code)
        && precipitation_chance < 50.0
        && wind_speed_mph < 25.0
}

/// Human-readable description for a WMO weather code.
pub fn weather_description(code: u16) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        80 => "Slight showers",
        81 => "Moderate showers",
        82 => "Violent showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekend_saturday() {
        // 2026-03-07 is a Saturday
        assert!(is_weekend("2026-03-07"));
    }

    #[test]
    fn test_weekend_friday() {
        // 2026-03-06 is a Friday; Fridays count as weekend
        assert!(is_weekend("2026-03-06"));
    }

    #[test]
    fn test_weekend_monday() {
        // 2026-03-02 is a Monday
        assert!(!is_weekend("2026-03-02"));
    }

    #[test]
    fn test_weekend_unparseable_date() {
        assert!(!is_weekend("not-a-date"));
        assert!(!is_weekend(""));
        assert!(!is_weekend("2026/03/07"));
    }

    #[test]
    fn test_outdoor_stadium() {
        assert!(is_outdoor("Yankee Stadium"));
    }

    #[test]
    fn test_outdoor_is_case_insensitive() {
        assert!(is_outdoor("MADISON SQUARE PARK"));
        assert!(is_outdoor("forest hills pavilion"));
    }

    #[test]
    fn test_indoor_theatre() {
        assert!(!is_outdoor("City Theatre"));
        assert!(!is_outdoor(""));
    }

    #[test]
    fn test_suitable_outdoor_clear_day() {
        assert!(is_suitable_outdoor(0, 10.0, 5.0));
    }

    #[test]
    fn test_unsuitable_on_bad_code() {
        // Thunderstorm disqualifies even with no rain chance reported
        assert!(!is_suitable_outdoor(95, 0.0, 0.0));
    }

    #[test]
    fn test_unsuitable_on_rain_chance() {
        assert!(!is_suitable_outdoor(1, 50.0, 5.0));
        assert!(is_suitable_outdoor(1, 49.9, 5.0));
    }

    #[test]
    fn test_unsuitable_on_wind() {
        assert!(!is_suitable_outdoor(0, 10.0, 25.0));
        assert!(is_suitable_outdoor(0, 10.0, 24.9));
    }

    #[test]
    fn test_weather_description_known_and_unknown() {
        assert_eq!(weather_description(0), "Clear sky");
        assert_eq!(weather_description(95), "Thunderstorm");
        assert_eq!(weather_description(42), "Unknown");
    }
}
