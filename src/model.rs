/// Shared data types for the flood prediction service.
///
/// Raw records (`FloodIncident`, `WeatherObservation`) come out of the
/// typed table adapter in `ingest::records`; `HourlySlot` is the join key
/// used by the feature builder. Everything here is timezone-normalized to
/// UTC; local calendar features are derived later from the configured
/// timezone.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder for missing categorical weather values.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

// ---------------------------------------------------------------------------
// Flood incidents
// ---------------------------------------------------------------------------

/// One reported flooding incident on a road sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodIncident {
    pub timestamp: DateTime<Utc>,
    pub city: String,
    pub road_sector: String,
    /// Free-text location as reported; equals `road_sector` when the
    /// source table has no separate location column.
    pub location: String,
    /// Ordinal depth label as reported, e.g. "Knee Deep".
    pub depth_category: String,
    pub passability: Option<String>,
}

impl FloodIncident {
    /// Water depth in inches implied by the reported category (0 if unmapped).
    pub fn depth_inches(&self) -> f64 {
        DepthCategory::parse(&self.depth_category)
            .map(DepthCategory::inches)
            .unwrap_or(0.0)
    }
}

/// Flood depth categories used in road-flooding advisories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DepthCategory {
    Gutter,
    HalfKnee,
    HalfTire,
    Knee,
    HalfDoor,
    Tire,
    Waist,
    Chest,
    Flooded,
}

impl DepthCategory {
    /// Parses an advisory label. Case, hyphens and underscores are ignored,
    /// and the trailing "deep" is optional ("Knee-deep", "KNEE DEEP", "knee").
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label
            .to_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let key = normalized.strip_suffix(" deep").unwrap_or(&normalized);

        match key {
            "gutter" => Some(DepthCategory::Gutter),
            "half knee" => Some(DepthCategory::HalfKnee),
            "half tire" => Some(DepthCategory::HalfTire),
            "knee" => Some(DepthCategory::Knee),
            "half door" => Some(DepthCategory::HalfDoor),
            "tire" => Some(DepthCategory::Tire),
            "waist" => Some(DepthCategory::Waist),
            "chest" => Some(DepthCategory::Chest),
            "flooded" => Some(DepthCategory::Flooded),
            _ => None,
        }
    }

    /// Approximate water depth in inches.
    pub fn inches(self) -> f64 {
        match self {
            DepthCategory::Gutter => 8.0,
            DepthCategory::HalfKnee => 10.0,
            DepthCategory::HalfTire => 13.0,
            DepthCategory::Knee => 19.0,
            DepthCategory::HalfDoor => 26.0,
            DepthCategory::Tire => 26.0,
            DepthCategory::Waist => 37.0,
            DepthCategory::Chest => 45.0,
            DepthCategory::Flooded => 48.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// One raw weather observation for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub timestamp: DateTime<Utc>,
    pub city: String,
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub clouds: f64,
    /// Rainfall over the last hour in mm; missing or non-numeric is 0.
    pub rain_1h: f64,
    pub weather_main: String,
    pub weather_description: String,
}

// ---------------------------------------------------------------------------
// Join key
// ---------------------------------------------------------------------------

/// (city, calendar hour) join key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HourlySlot {
    pub city: String,
    pub hour: DateTime<Utc>,
}

impl HourlySlot {
    pub fn new(city: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            city: city.to_string(),
            hour: floor_to_hour(timestamp),
        }
    }
}

/// Truncates a timestamp to the start of its hour.
pub fn floor_to_hour(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp
        .with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_minute(0))
        .unwrap_or(timestamp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_depth_category_parse_is_lenient() {
        assert_eq!(DepthCategory::parse("Knee Deep"), Some(DepthCategory::Knee));
        assert_eq!(DepthCategory::parse("knee-deep"), Some(DepthCategory::Knee));
        assert_eq!(DepthCategory::parse("  WAIST   DEEP "), Some(DepthCategory::Waist));
        assert_eq!(DepthCategory::parse("Half_Knee"), Some(DepthCategory::HalfKnee));
        assert_eq!(DepthCategory::parse("Flooded"), Some(DepthCategory::Flooded));
        assert_eq!(DepthCategory::parse("Ankle Deep"), None);
        assert_eq!(DepthCategory::parse(""), None);
    }

    #[test]
    fn test_depth_increases_with_category() {
        assert!(DepthCategory::Gutter.inches() < DepthCategory::Knee.inches());
        assert!(DepthCategory::Knee.inches() < DepthCategory::Waist.inches());
        assert!(DepthCategory::Waist.inches() < DepthCategory::Flooded.inches());
    }

    #[test]
    fn test_unmapped_category_has_zero_depth() {
        let incident = FloodIncident {
            timestamp: Utc.with_ymd_and_hms(2024, 7, 24, 8, 0, 0).unwrap(),
            city: "Manila".to_string(),
            road_sector: "España Blvd".to_string(),
            location: "España Blvd".to_string(),
            depth_category: "Passable to light vehicles".to_string(),
            passability: None,
        };
        assert_eq!(incident.depth_inches(), 0.0);
    }

    #[test]
    fn test_floor_to_hour() {
        let t = Utc.with_ymd_and_hms(2024, 7, 24, 8, 47, 13).unwrap();
        assert_eq!(floor_to_hour(t), Utc.with_ymd_and_hms(2024, 7, 24, 8, 0, 0).unwrap());

        let slot = HourlySlot::new("Manila", t);
        assert_eq!(slot.hour.minute(), 0);
        assert_eq!(slot.city, "Manila");
    }
}
