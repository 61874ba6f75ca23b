/// Typed adapter at the raw-table boundary.
///
/// Converts header-keyed `Table`s into `FloodIncident` / `WeatherObservation`
/// records. Required columns are checked up front and reported as
/// `DataError::MissingColumn`; per-row problems (unparseable timestamp,
/// blank road) drop only that row, mirroring the `dropna` on
/// `datetime` / `road_sector` the incident table has always had.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use super::table::{Table, TableRow};
use crate::error::DataError;
use crate::model::{FloodIncident, UNKNOWN_CATEGORY, WeatherObservation};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const COL_DATETIME: &str = "datetime";
pub const COL_CITY: &str = "city";
pub const COL_ROAD_SECTOR: &str = "road_sector";
pub const COL_LOCATION: &str = "location";
pub const COL_DEPTH: &str = "flood type/depth";
pub const COL_PASSABILITY: &str = "passability";

pub const COL_TEMP: &str = "main.temp";
pub const COL_FEELS_LIKE: &str = "main.feels_like";
pub const COL_TEMP_MIN: &str = "main.temp_min";
pub const COL_TEMP_MAX: &str = "main.temp_max";
pub const COL_PRESSURE: &str = "main.pressure";
pub const COL_HUMIDITY: &str = "main.humidity";
pub const COL_WIND_SPEED: &str = "wind.speed";
pub const COL_WIND_GUST: &str = "wind.gust";
pub const COL_CLOUDS: &str = "clouds.all";
pub const COL_RAIN_ALIASES: [&str; 3] = ["rain.1h", "rain1h", "rain_1h"];
pub const COL_WEATHER_MAIN: &str = "weather.main";
pub const COL_WEATHER_DESC: &str = "weather.description";

/// Timestamp layouts seen in the incident and weather exports.
const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// ---------------------------------------------------------------------------
// Incidents
// ---------------------------------------------------------------------------

/// Converts the raw incident table into typed records.
pub fn incidents_from_table(
    table: &Table,
    table_name: &str,
    tz: Tz,
) -> Result<Vec<FloodIncident>, DataError> {
    let datetime = require(table, table_name, COL_DATETIME)?;
    let city = require(table, table_name, COL_CITY)?;
    let depth = require(table, table_name, COL_DEPTH)?;
    let road = table
        .first_column_of(&[COL_ROAD_SECTOR, COL_LOCATION])
        .ok_or_else(|| missing(table_name, COL_ROAD_SECTOR))?;
    let location = table.column_index(COL_LOCATION).unwrap_or(road);
    let passability = table.column_index(COL_PASSABILITY);

    let mut incidents = Vec::with_capacity(table.len());
    let mut dropped = 0usize;

    for row in table.rows() {
        let timestamp = row.at(datetime).and_then(|s| parse_timestamp(s, tz));
        let road_sector = row.at(road);

        let (Some(timestamp), Some(road_sector)) = (timestamp, road_sector) else {
            dropped += 1;
            continue;
        };

        incidents.push(FloodIncident {
            timestamp,
            city: row.at(city).unwrap_or_default().to_string(),
            road_sector: road_sector.to_string(),
            location: row.at(location).unwrap_or(road_sector).to_string(),
            depth_category: row.at(depth).unwrap_or_default().to_string(),
            passability: passability
                .map(|i| row.at(i).unwrap_or(UNKNOWN_CATEGORY).to_string()),
        });
    }

    debug!(table = table_name, kept = incidents.len(), dropped, "adapted incident table");
    Ok(incidents)
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Converts the raw hourly weather table into typed records.
pub fn observations_from_table(
    table: &Table,
    table_name: &str,
    tz: Tz,
) -> Result<Vec<WeatherObservation>, DataError> {
    let datetime = require(table, table_name, COL_DATETIME)?;
    let city = require(table, table_name, COL_CITY)?;
    let temp = require(table, table_name, COL_TEMP)?;
    let pressure = require(table, table_name, COL_PRESSURE)?;
    let humidity = require(table, table_name, COL_HUMIDITY)?;
    let wind_speed = require(table, table_name, COL_WIND_SPEED)?;

    let feels_like = table.column_index(COL_FEELS_LIKE);
    let temp_min = table.column_index(COL_TEMP_MIN);
    let temp_max = table.column_index(COL_TEMP_MAX);
    let wind_gust = table.column_index(COL_WIND_GUST);
    let clouds = table.column_index(COL_CLOUDS);
    let rain = table.first_column_of(&COL_RAIN_ALIASES);
    let weather_main = table.column_index(COL_WEATHER_MAIN);
    let weather_desc = table.column_index(COL_WEATHER_DESC);

    let mut observations = Vec::with_capacity(table.len());
    let mut dropped = 0usize;

    for row in table.rows() {
        let timestamp = row.at(datetime).and_then(|s| parse_timestamp(s, tz));
        let city_name = row.at(city);

        let (Some(timestamp), Some(city_name)) = (timestamp, city_name) else {
            dropped += 1;
            continue;
        };

        let t = number(&row, Some(temp)).unwrap_or(0.0);
        observations.push(WeatherObservation {
            timestamp,
            city: city_name.to_string(),
            temp: t,
            feels_like: number(&row, feels_like).unwrap_or(t),
            temp_min: number(&row, temp_min).unwrap_or(t),
            temp_max: number(&row, temp_max).unwrap_or(t),
            pressure: number(&row, Some(pressure)).unwrap_or(0.0),
            humidity: number(&row, Some(humidity)).unwrap_or(0.0),
            wind_speed: number(&row, Some(wind_speed)).unwrap_or(0.0),
            wind_gust: number(&row, wind_gust).unwrap_or(0.0),
            clouds: number(&row, clouds).unwrap_or(0.0),
            rain_1h: number(&row, rain).unwrap_or(0.0),
            weather_main: category(&row, weather_main),
            weather_description: category(&row, weather_desc),
        });
    }

    debug!(table = table_name, kept = observations.len(), dropped, "adapted weather table");
    Ok(observations)
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// Parses a timestamp cell and normalizes it to UTC.
///
/// Values with an explicit offset are converted; naive values are read as
/// wall-clock time in `tz`. A bare date means midnight local time.
pub fn parse_timestamp(value: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn number(row: &TableRow<'_>, column: Option<usize>) -> Option<f64> {
    column
        .and_then(|i| row.at(i))
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn category(row: &TableRow<'_>, column: Option<usize>) -> String {
    column
        .and_then(|i| row.at(i))
        .unwrap_or(UNKNOWN_CATEGORY)
        .to_string()
}

fn require(table: &Table, table_name: &str, column: &str) -> Result<usize, DataError> {
    table
        .column_index(column)
        .ok_or_else(|| missing(table_name, column))
}

fn missing(table_name: &str, column: &str) -> DataError {
    DataError::MissingColumn {
        table: table_name.to_string(),
        column: column.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
