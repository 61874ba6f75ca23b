/// Feature column layout shared by training and inference.
///
/// The dense vector is the 48 base columns in `BASE_COLUMNS` order followed
/// by one `road_<sector>` indicator per known road (sorted). Training rows
/// and inference `FeatureMap`s both go through `FeatureSchema`, so the two
/// paths cannot disagree on column order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lag / rolling-window lengths, in rows.
pub const LAG_WINDOWS: [usize; 6] = [1, 2, 3, 6, 12, 24];

pub const BASE_FEATURE_COUNT: usize = 48;

pub const ROAD_PREFIX: &str = "road_";

pub const BASE_COLUMNS: [&str; BASE_FEATURE_COUNT] = [
    "main_temp",
    "main_feels_like",
    "main_temp_min",
    "main_temp_max",
    "main_pressure",
    "main_humidity",
    "wind_speed",
    "wind_gust",
    "clouds_all",
    "rain1h",
    "hour",
    "day_of_week",
    "month",
    "is_weekend",
    "weather_main_encoded",
    "weather_desc_encoded",
    "rain1h_lag_1",
    "rain1h_lag_2",
    "rain1h_lag_3",
    "rain1h_lag_6",
    "rain1h_lag_12",
    "rain1h_lag_24",
    "main_temp_lag_1",
    "main_temp_lag_2",
    "main_temp_lag_3",
    "main_temp_lag_6",
    "main_temp_lag_12",
    "main_temp_lag_24",
    "main_humidity_lag_1",
    "main_humidity_lag_2",
    "main_humidity_lag_3",
    "main_humidity_lag_6",
    "main_humidity_lag_12",
    "main_humidity_lag_24",
    "rain1h_sum_1h",
    "rain1h_sum_2h",
    "rain1h_sum_3h",
    "rain1h_sum_6h",
    "rain1h_sum_12h",
    "rain1h_sum_24h",
    "is_raining",
    "heavy_rain",
    "very_heavy_rain",
    "high_wind",
    "pressure_change_1h",
    "pressure_change_3h",
    "temp_range",
    "gust_ratio",
];

pub const COL_WEATHER_MAIN_ENCODED: &str = "weather_main_encoded";
pub const COL_WEATHER_DESC_ENCODED: &str = "weather_desc_encoded";

// ---------------------------------------------------------------------------
// Per-row numeric features
// ---------------------------------------------------------------------------

/// Numeric features of one (road, hour) row, before road one-hots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseFeatures {
    pub main_temp: f64,
    pub main_feels_like: f64,
    pub main_temp_min: f64,
    pub main_temp_max: f64,
    pub main_pressure: f64,
    pub main_humidity: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub clouds_all: f64,
    pub rain1h: f64,
    pub hour: f64,
    pub day_of_week: f64,
    pub month: f64,
    pub is_weekend: f64,
    pub weather_main_encoded: f64,
    pub weather_desc_encoded: f64,
    /// Indexed like `LAG_WINDOWS`.
    pub rain_lags: [f64; 6],
    pub temp_lags: [f64; 6],
    pub humidity_lags: [f64; 6],
    pub rain_sums: [f64; 6],
    pub is_raining: f64,
    pub heavy_rain: f64,
    pub very_heavy_rain: f64,
    pub high_wind: f64,
    pub pressure_change_1h: f64,
    pub pressure_change_3h: f64,
    pub temp_range: f64,
    pub gust_ratio: f64,
}

impl BaseFeatures {
    /// Values in `BASE_COLUMNS` order.
    pub fn values(&self) -> [f64; BASE_FEATURE_COUNT] {
        let mut out = [0.0; BASE_FEATURE_COUNT];
        let head = [
            self.main_temp,
            self.main_feels_like,
            self.main_temp_min,
            self.main_temp_max,
            self.main_pressure,
            self.main_humidity,
            self.wind_speed,
            self.wind_gust,
            self.clouds_all,
            self.rain1h,
            self.hour,
            self.day_of_week,
            self.month,
            self.is_weekend,
            self.weather_main_encoded,
            self.weather_desc_encoded,
        ];
        out[..16].copy_from_slice(&head);
        out[16..22].copy_from_slice(&self.rain_lags);
        out[22..28].copy_from_slice(&self.temp_lags);
        out[28..34].copy_from_slice(&self.humidity_lags);
        out[34..40].copy_from_slice(&self.rain_sums);
        out[40..].copy_from_slice(&[
            self.is_raining,
            self.heavy_rain,
            self.very_heavy_rain,
            self.high_wind,
            self.pressure_change_1h,
            self.pressure_change_3h,
            self.temp_range,
            self.gust_ratio,
        ]);
        out
    }
}

// ---------------------------------------------------------------------------
// Inference input
// ---------------------------------------------------------------------------

/// Inference-time feature values keyed by column name.
///
/// Numeric keys missing from `values` default to 0. The categorical
/// weather fields are encoded by the predictor with the fitted encoders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMap {
    #[serde(default)]
    pub values: HashMap<String, f64>,
    #[serde(default)]
    pub weather_main: Option<String>,
    #[serde(default)]
    pub weather_description: Option<String>,
    #[serde(default)]
    pub road_sector: Option<String>,
}

impl FeatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: f64) -> Self {
        self.values.insert(column.to_string(), value);
        self
    }

    pub fn value(&self, column: &str) -> f64 {
        self.values.get(column).copied().unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
    roads: Vec<String>,
}

impl FeatureSchema {
    /// Schema over the base columns plus one indicator per road.
    pub fn new(roads: &[String]) -> Self {
        let mut roads = roads.to_vec();
        roads.sort();
        roads.dedup();

        let mut columns: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(roads.iter().map(|r| road_column(r)));
        Self { columns, roads }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn roads(&self) -> &[String] {
        &self.roads
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Dense vector for a training row.
    pub fn vectorize(&self, base: &BaseFeatures, road_sector: &str) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&base.values());
        out.extend(self.roads.iter().map(|r| if r == road_sector { 1.0 } else { 0.0 }));
        out
    }

    /// Dense vector for an inference map. The encoded categorical columns
    /// are taken from `weather_main_code` / `weather_desc_code` when given.
    pub fn vectorize_map(
        &self,
        map: &FeatureMap,
        weather_main_code: Option<f64>,
        weather_desc_code: Option<f64>,
    ) -> Vec<f64> {
        let mut out: Vec<f64> = BASE_COLUMNS
            .iter()
            .map(|column| match *column {
                COL_WEATHER_MAIN_ENCODED => weather_main_code.unwrap_or_else(|| map.value(column)),
                COL_WEATHER_DESC_ENCODED => weather_desc_code.unwrap_or_else(|| map.value(column)),
                _ => map.value(column),
            })
            .collect();

        let road = map.road_sector.as_deref();
        out.extend(self.roads.iter().map(|r| if Some(r.as_str()) == road { 1.0 } else { 0.0 }));
        out
    }
}

pub fn road_column(road_sector: &str) -> String {
    format!("{}{}", ROAD_PREFIX, road_sector)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_values_follow_column_order() {
        let base = BaseFeatures {
            main_temp: 1.0,
            rain1h: 2.0,
            hour: 3.0,
            rain_lags: [10.0, 11.0, 12.0, 13.0, 14.0, 15.0],
            rain_sums: [20.0, 21.0, 22.0, 23.0, 24.0, 25.0],
            gust_ratio: 9.0,
            ..BaseFeatures::default()
        };
        let values = base.values();
        let at = |name: &str| values[BASE_COLUMNS.iter().position(|c| *c == name).unwrap()];

        assert_eq!(at("main_temp"), 1.0);
        assert_eq!(at("rain1h"), 2.0);
        assert_eq!(at("hour"), 3.0);
        assert_eq!(at("rain1h_lag_1"), 10.0);
        assert_eq!(at("rain1h_lag_24"), 15.0);
        assert_eq!(at("rain1h_sum_3h"), 22.0);
        assert_eq!(at("gust_ratio"), 9.0);
    }

    #[test]
    fn test_schema_appends_sorted_road_columns() {
        let schema = FeatureSchema::new(&["Taft Ave".to_string(), "EDSA".to_string(), "EDSA".to_string()]);
        assert_eq!(schema.len(), BASE_FEATURE_COUNT + 2);
        assert_eq!(schema.columns()[BASE_FEATURE_COUNT], "road_EDSA");
        assert_eq!(schema.columns()[BASE_FEATURE_COUNT + 1], "road_Taft Ave");
    }

    #[test]
    fn test_training_and_inference_vectors_agree() {
        let schema = FeatureSchema::new(&["EDSA".to_string(), "Taft Ave".to_string()]);
        let base = BaseFeatures {
            main_temp: 27.0,
            rain1h: 6.5,
            weather_main_encoded: 1.0,
            ..BaseFeatures::default()
        };
        let from_row = schema.vectorize(&base, "Taft Ave");

        let map = FeatureMap {
            road_sector: Some("Taft Ave".to_string()),
            ..FeatureMap::new().with("main_temp", 27.0).with("rain1h", 6.5)
        };
        let from_map = schema.vectorize_map(&map, Some(1.0), None);

        assert_eq!(from_row, from_map);
    }

    #[test]
    fn test_unknown_road_sets_no_indicator() {
        let schema = FeatureSchema::new(&["EDSA".to_string()]);
        let map = FeatureMap { road_sector: Some("Nowhere".to_string()), ..FeatureMap::new() };
        let v = schema.vectorize_map(&map, None, None);
        assert_eq!(v.len(), BASE_FEATURE_COUNT + 1);
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
