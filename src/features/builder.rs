/// Training table construction.
///
/// Turns typed incidents and hourly weather into one row per
/// (road_sector, hour):
///
///   incidents --dedupe--> worst per (hour, road) ----------------+
///                                                                 |
///   weather --aggregate per (city, hour)--> × roads of city --left join--> rows
///
/// then adds calendar, lag, rolling, indicator and encoded categorical
/// features. An hour with no incident on a road is labeled not flooded;
/// roads that never had an incident never get rows.

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use super::encoding::LabelEncoder;
use super::schema::{BaseFeatures, FeatureSchema, LAG_WINDOWS};
use crate::model::{FloodIncident, HourlySlot, WeatherObservation, floor_to_hour};

/// Rain at or above this (mm/h) is "heavy".
pub const HEAVY_RAIN_MM: f64 = 2.5;
/// Rain at or above this (mm/h) is "very heavy".
pub const VERY_HEAVY_RAIN_MM: f64 = 5.0;
/// Wind speed strictly above this is "high".
pub const HIGH_WIND_SPEED: f64 = 10.0;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One (road_sector, hour) row of the training table.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub road_sector: String,
    pub city: String,
    pub hour: DateTime<Utc>,
    pub weather_main: String,
    pub weather_description: String,
    pub features: BaseFeatures,
    /// Worst reported depth in the hour; 0 when not flooded or unmapped.
    pub depth_inches: f64,
    pub is_flooded: bool,
}

#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub rows: Vec<TrainingRow>,
    pub weather_main: LabelEncoder,
    pub weather_desc: LabelEncoder,
    pub schema: FeatureSchema,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Dense feature vectors in schema order.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .map(|r| self.schema.vectorize(&r.features, &r.road_sector))
            .collect()
    }

    pub fn labels(&self) -> Vec<usize> {
        self.rows.iter().map(|r| usize::from(r.is_flooded)).collect()
    }

    pub fn positives(&self) -> usize {
        self.rows.iter().filter(|r| r.is_flooded).count()
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Builds the training table. Calendar features use local time in `tz`.
pub fn build_features(
    incidents: &[FloodIncident],
    weather: &[WeatherObservation],
    tz: Tz,
) -> FeatureTable {
    let incidents = dedupe_incidents(incidents);
    let worst = worst_per_road_hour(&incidents);
    let slots = aggregate_weather(weather);
    let road_city = assign_roads_to_cities(&incidents);

    let mut roads_by_city: HashMap<&str, Vec<&str>> = HashMap::new();
    for (road, city) in &road_city {
        roads_by_city.entry(city.as_str()).or_default().push(road.as_str());
    }

    let weather_main = LabelEncoder::fit(weather.iter().map(|w| w.weather_main.as_str()));
    let weather_desc = LabelEncoder::fit(weather.iter().map(|w| w.weather_description.as_str()));

    // left join: every weather slot of a city × every road of that city
    let mut rows = Vec::new();
    for (slot, agg) in &slots {
        let Some(roads) = roads_by_city.get(slot.city.as_str()) else {
            continue;
        };
        for road in roads {
            let hit = worst.get(&(road.to_string(), slot.hour));
            rows.push(TrainingRow {
                road_sector: road.to_string(),
                city: slot.city.clone(),
                hour: slot.hour,
                weather_main: agg.weather_main.clone(),
                weather_description: agg.weather_description.clone(),
                features: agg.base(&weather_main, &weather_desc),
                depth_inches: hit.map(|i| i.depth_inches()).unwrap_or(0.0),
                is_flooded: hit.is_some_and(|i| i.depth_inches() > 0.0),
            });
        }
    }

    rows.sort_by(|a, b| (&a.road_sector, a.hour).cmp(&(&b.road_sector, b.hour)));

    add_calendar_features(&mut rows, tz);
    add_series_features(&mut rows);

    let roads: Vec<String> = road_city.keys().cloned().collect();
    let schema = FeatureSchema::new(&roads);
    let positives = rows.iter().filter(|r| r.is_flooded).count();

    info!(
        rows = rows.len(),
        positives,
        roads = roads.len(),
        slots = slots.len(),
        "built training table"
    );

    FeatureTable { rows, weather_main, weather_desc, schema }
}

/// Keeps the last record for each (city, road, timestamp), in input order.
fn dedupe_incidents(incidents: &[FloodIncident]) -> Vec<&FloodIncident> {
    let mut last: HashMap<(&str, &str, DateTime<Utc>), usize> = HashMap::new();
    for (i, incident) in incidents.iter().enumerate() {
        last.insert((incident.city.as_str(), incident.road_sector.as_str(), incident.timestamp), i);
    }

    let mut keep: Vec<usize> = last.into_values().collect();
    keep.sort_unstable();
    if keep.len() < incidents.len() {
        debug!(dropped = incidents.len() - keep.len(), "dropped duplicate incidents");
    }
    keep.into_iter().map(|i| &incidents[i]).collect()
}

/// Worst incident per (road, hour). Equal depths keep the later record.
fn worst_per_road_hour<'a>(
    incidents: &[&'a FloodIncident],
) -> HashMap<(String, DateTime<Utc>), &'a FloodIncident> {
    let mut worst: HashMap<(String, DateTime<Utc>), &FloodIncident> = HashMap::new();
    for &incident in incidents {
        let key = (incident.road_sector.clone(), floor_to_hour(incident.timestamp));
        match worst.get(&key) {
            Some(current) if current.depth_inches() > incident.depth_inches() => {}
            _ => {
                worst.insert(key, incident);
            }
        }
    }
    worst
}

/// Each road goes to the city where it has the most incidents; ties go to
/// the lexicographically smallest city.
fn assign_roads_to_cities(incidents: &[&FloodIncident]) -> BTreeMap<String, String> {
    let mut counts: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for incident in incidents {
        *counts
            .entry(incident.road_sector.as_str())
            .or_default()
            .entry(incident.city.as_str())
            .or_default() += 1;
    }

    counts
        .into_iter()
        .filter_map(|(road, cities)| {
            most_common(cities).map(|city| (road.to_string(), city.to_string()))
        })
        .collect()
}

/// Key with the highest count; ties keep the smallest key.
fn most_common<K: Ord>(counts: BTreeMap<K, usize>) -> Option<K> {
    let mut best: Option<(K, usize)> = None;
    for (key, n) in counts {
        if best.as_ref().is_none_or(|(_, m)| n > *m) {
            best = Some((key, n));
        }
    }
    best.map(|(k, _)| k)
}

// ---------------------------------------------------------------------------
// Weather aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct SlotWeather {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: f64,
    wind_speed: f64,
    wind_gust: f64,
    clouds: f64,
    rain_1h: f64,
    weather_main: String,
    weather_description: String,
}

impl SlotWeather {
    /// Raw-weather part of the feature row; the rest is filled later.
    fn base(&self, main: &LabelEncoder, desc: &LabelEncoder) -> BaseFeatures {
        BaseFeatures {
            main_temp: self.temp,
            main_feels_like: self.feels_like,
            main_temp_min: self.temp_min,
            main_temp_max: self.temp_max,
            main_pressure: self.pressure,
            main_humidity: self.humidity,
            wind_speed: self.wind_speed,
            wind_gust: self.wind_gust,
            clouds_all: self.clouds,
            rain1h: self.rain_1h,
            weather_main_encoded: main.code(&self.weather_main).unwrap_or(0) as f64,
            weather_desc_encoded: desc.code(&self.weather_description).unwrap_or(0) as f64,
            is_raining: flag(self.rain_1h > 0.0),
            heavy_rain: flag(self.rain_1h >= HEAVY_RAIN_MM),
            very_heavy_rain: flag(self.rain_1h >= VERY_HEAVY_RAIN_MM),
            high_wind: flag(self.wind_speed > HIGH_WIND_SPEED),
            temp_range: self.temp_max - self.temp_min,
            gust_ratio: if self.wind_speed == 0.0 { 0.0 } else { self.wind_gust / self.wind_speed },
            ..BaseFeatures::default()
        }
    }
}

#[derive(Default)]
struct SlotAccumulator<'a> {
    n: usize,
    temp: f64,
    feels_like: f64,
    pressure: f64,
    humidity: f64,
    wind_speed: f64,
    wind_gust: f64,
    clouds: f64,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    rain_1h: f64,
    mains: BTreeMap<&'a str, usize>,
    descriptions: BTreeMap<&'a str, usize>,
}

impl<'a> SlotAccumulator<'a> {
    fn add(&mut self, w: &'a WeatherObservation) {
        self.n += 1;
        self.temp += w.temp;
        self.feels_like += w.feels_like;
        self.pressure += w.pressure;
        self.humidity += w.humidity;
        self.wind_speed += w.wind_speed;
        self.wind_gust += w.wind_gust;
        self.clouds += w.clouds;
        self.temp_min = Some(self.temp_min.map_or(w.temp_min, |m| m.min(w.temp_min)));
        self.temp_max = Some(self.temp_max.map_or(w.temp_max, |m| m.max(w.temp_max)));
        self.rain_1h += w.rain_1h;
        *self.mains.entry(&w.weather_main).or_default() += 1;
        *self.descriptions.entry(&w.weather_description).or_default() += 1;
    }

    fn finish(self) -> SlotWeather {
        let n = self.n.max(1) as f64;
        SlotWeather {
            temp: self.temp / n,
            feels_like: self.feels_like / n,
            temp_min: self.temp_min.unwrap_or_default(),
            temp_max: self.temp_max.unwrap_or_default(),
            pressure: self.pressure / n,
            humidity: self.humidity / n,
            wind_speed: self.wind_speed / n,
            wind_gust: self.wind_gust / n,
            clouds: self.clouds / n,
            rain_1h: self.rain_1h,
            weather_main: most_common(self.mains).unwrap_or_default().to_string(),
            weather_description: most_common(self.descriptions).unwrap_or_default().to_string(),
        }
    }
}

/// Mean / min / max / sum / mode per (city, hour).
fn aggregate_weather(weather: &[WeatherObservation]) -> BTreeMap<HourlySlot, SlotWeather> {
    let mut slots: BTreeMap<HourlySlot, SlotAccumulator> = BTreeMap::new();
    for w in weather {
        slots.entry(HourlySlot::new(&w.city, w.timestamp)).or_default().add(w);
    }
    slots.into_iter().map(|(slot, acc)| (slot, acc.finish())).collect()
}

// ---------------------------------------------------------------------------
// Derived features
// ---------------------------------------------------------------------------

fn add_calendar_features(rows: &mut [TrainingRow], tz: Tz) {
    for row in rows {
        let local = row.hour.with_timezone(&tz);
        let day_of_week = local.weekday().num_days_from_monday();
        row.features.hour = local.hour() as f64;
        row.features.day_of_week = day_of_week as f64;
        row.features.month = local.month() as f64;
        row.features.is_weekend = flag(day_of_week >= 5);
    }
}

/// Lags, rolling sums and pressure deltas, per road in time order.
/// `rows` must already be sorted by (road_sector, hour).
fn add_series_features(rows: &mut [TrainingRow]) {
    if rows.is_empty() {
        return;
    }
    let n = rows.len() as f64;
    let mean_temp = rows.iter().map(|r| r.features.main_temp).sum::<f64>() / n;
    let mean_humidity = rows.iter().map(|r| r.features.main_humidity).sum::<f64>() / n;

    let mut start = 0;
    while start < rows.len() {
        let end = start
            + rows[start..]
                .iter()
                .take_while(|r| r.road_sector == rows[start].road_sector)
                .count();
        fill_series(&mut rows[start..end], mean_temp, mean_humidity);
        start = end;
    }
}

fn fill_series(series: &mut [TrainingRow], mean_temp: f64, mean_humidity: f64) {
    let rain: Vec<f64> = series.iter().map(|r| r.features.rain1h).collect();
    let temp: Vec<f64> = series.iter().map(|r| r.features.main_temp).collect();
    let humidity: Vec<f64> = series.iter().map(|r| r.features.main_humidity).collect();
    let pressure: Vec<f64> = series.iter().map(|r| r.features.main_pressure).collect();

    for (i, row) in series.iter_mut().enumerate() {
        let f = &mut row.features;
        for (slot, &k) in LAG_WINDOWS.iter().enumerate() {
            let lagged = i.checked_sub(k);
            f.rain_lags[slot] = lagged.map_or(0.0, |j| rain[j]);
            f.temp_lags[slot] = lagged.map_or(mean_temp, |j| temp[j]);
            f.humidity_lags[slot] = lagged.map_or(mean_humidity, |j| humidity[j]);
            f.rain_sums[slot] = rain[(i + 1).saturating_sub(k)..=i].iter().sum();
        }
        f.pressure_change_1h = i.checked_sub(1).map_or(0.0, |j| pressure[i] - pressure[j]);
        f.pressure_change_3h = i.checked_sub(3).map_or(0.0, |j| pressure[i] - pressure[j]);
    }
}

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;
    use crate::ingest::records::{incidents_from_table, observations_from_table};
    use crate::ingest::Table;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn manila() -> Tz {
        "Asia/Manila".parse().unwrap()
    }

    fn utc(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 24, h, 0, 0).unwrap()
    }

    fn incident(city: &str, road: &str, ts: DateTime<Utc>, depth: &str) -> FloodIncident {
        FloodIncident {
            timestamp: ts,
            city: city.to_string(),
            road_sector: road.to_string(),
            location: road.to_string(),
            depth_category: depth.to_string(),
            passability: None,
        }
    }

    fn obs(city: &str, ts: DateTime<Utc>, rain: f64, main: &str) -> WeatherObservation {
        WeatherObservation {
            timestamp: ts,
            city: city.to_string(),
            temp: 27.0,
            feels_like: 30.0,
            temp_min: 26.0,
            temp_max: 28.0,
            pressure: 1005.0,
            humidity: 90.0,
            wind_speed: 4.0,
            wind_gust: 6.0,
            clouds: 100.0,
            rain_1h: rain,
            weather_main: main.to_string(),
            weather_description: format!("{} description", main),
        }
    }

    fn fixture_table() -> FeatureTable {
        let tz = manila();
        let inc = Table::from_csv_bytes(fixture_incidents_csv().as_bytes()).unwrap();
        let wx = Table::from_csv_bytes(fixture_weather_csv().as_bytes()).unwrap();
        build_features(
            &incidents_from_table(&inc, "incidents", tz).unwrap(),
            &observations_from_table(&wx, "weather", tz).unwrap(),
            tz,
        )
    }

    #[test]
    fn test_one_row_per_road_and_hour() {
        let table = fixture_table();
        let mut keys: Vec<_> = table.rows.iter().map(|r| (&r.road_sector, r.hour)).collect();
        let before = keys.len();
        keys.dedup();
        assert_eq!(keys.len(), before);
        // Manila: 3 hours × 2 roads, Quezon City: 2 hours × 1 road
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn test_rows_sorted_by_road_then_hour() {
        let table = fixture_table();
        for pair in table.rows.windows(2) {
            assert!((&pair[0].road_sector, pair[0].hour) < (&pair[1].road_sector, pair[1].hour));
        }
    }

    #[test]
    fn test_worst_incident_in_hour_wins() {
        let table = fixture_table();
        // España Blvd had Knee Deep then Waist Deep in the 08:00 local hour
        let row = table
            .rows
            .iter()
            .find(|r| r.road_sector == "España Blvd" && r.is_flooded)
            .unwrap();
        assert_eq!(row.depth_inches, 37.0);
        assert_eq!(table.rows.iter().filter(|r| r.road_sector == "España Blvd" && r.is_flooded).count(), 1);
    }

    #[test]
    fn test_hour_without_incident_is_not_flooded() {
        let table = fixture_table();
        let dry: Vec<_> = table.rows.iter().filter(|r| r.road_sector == "Taft Ave" && !r.is_flooded).collect();
        assert_eq!(dry.len(), 2);
        assert!(dry.iter().all(|r| r.depth_inches == 0.0));
        assert_eq!(table.positives(), 3);
    }

    #[test]
    fn test_unmapped_depth_incident_is_not_flooded() {
        let incidents = [incident("Manila", "Taft Ave", utc(1) + chrono::Duration::minutes(10), "Passable")];
        let weather = [obs("Manila", utc(1), 0.0, "Clouds")];
        let table = build_features(&incidents, &weather, manila());

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].depth_inches, 0.0);
        assert!(!table.rows[0].is_flooded);
        assert_eq!(table.positives(), 0);
    }

    #[test]
    fn test_city_without_incidents_gets_no_rows() {
        let incidents = [incident("Manila", "Taft Ave", utc(1), "Knee Deep")];
        let weather = [
            obs("Manila", utc(1), 6.0, "Rain"),
            obs("Pasig", utc(1), 9.0, "Rain"),
            obs("Pasig", utc(2), 3.0, "Rain"),
        ];
        let table = build_features(&incidents, &weather, manila());

        assert_eq!(table.len(), 1);
        assert!(table.rows.iter().all(|r| r.city == "Manila" && r.road_sector == "Taft Ave"));
        assert_eq!(table.schema.roads(), &["Taft Ave".to_string()]);
    }

    #[test]
    fn test_equal_depths_keep_later_record() {
        let mut early = incident("Manila", "Taft Ave", utc(1) + chrono::Duration::minutes(5), "Knee Deep");
        early.passability = Some("first".to_string());
        let mut late = incident("Manila", "Taft Ave", utc(1) + chrono::Duration::minutes(45), "Knee Deep");
        late.passability = Some("second".to_string());
        let incidents = [early, late];
        let refs: Vec<&FloodIncident> = incidents.iter().collect();

        let worst = worst_per_road_hour(&refs);
        let kept = worst.get(&("Taft Ave".to_string(), utc(1))).unwrap();
        assert_eq!(kept.passability.as_deref(), Some("second"));
    }

    #[test]
    fn test_duplicate_incidents_resolve_to_last() {
        let incidents = [
            incident("Manila", "Taft Ave", utc(1), "Waist Deep"),
            incident("Manila", "Taft Ave", utc(1), "Gutter Deep"),
        ];
        let deduped = dedupe_incidents(&incidents);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].depth_category, "Gutter Deep");
    }

    #[test]
    fn test_road_assigned_to_majority_city() {
        let incidents = [
            incident("Manila", "EDSA", utc(1), "Knee Deep"),
            incident("Quezon City", "EDSA", utc(2), "Knee Deep"),
            incident("Quezon City", "EDSA", utc(3), "Knee Deep"),
            incident("Pasay", "Roxas Blvd", utc(1), "Knee Deep"),
            incident("Manila", "Roxas Blvd", utc(2), "Knee Deep"),
        ];
        let refs: Vec<&FloodIncident> = incidents.iter().collect();
        let assigned = assign_roads_to_cities(&refs);
        assert_eq!(assigned["EDSA"], "Quezon City");
        // tie -> lexicographically smallest
        assert_eq!(assigned["Roxas Blvd"], "Manila");
    }

    #[test]
    fn test_weather_aggregation_per_slot() {
        let ts = utc(3);
        let mut a = obs("Manila", ts, 2.0, "Rain");
        a.temp = 26.0;
        a.temp_min = 25.0;
        let mut b = obs("Manila", ts + chrono::Duration::minutes(30), 3.0, "Clouds");
        b.temp = 28.0;
        b.temp_max = 29.5;
        let c = obs("Manila", ts + chrono::Duration::minutes(40), 0.0, "Clouds");

        let slots = aggregate_weather(&[a, b, c]);
        assert_eq!(slots.len(), 1);
        let w = slots.values().next().unwrap();
        assert_relative_eq!(w.temp, 27.0);
        assert_eq!(w.temp_min, 25.0);
        assert_eq!(w.temp_max, 29.5);
        assert_relative_eq!(w.rain_1h, 5.0);
        assert_eq!(w.weather_main, "Clouds");
    }

    #[test]
    fn test_mode_tie_picks_smallest_label() {
        let ts = utc(3);
        let slots = aggregate_weather(&[obs("Manila", ts, 0.0, "Rain"), obs("Manila", ts, 0.0, "Clouds")]);
        assert_eq!(slots.values().next().unwrap().weather_main, "Clouds");
    }

    #[test]
    fn test_calendar_features_use_local_time() {
        // 2024-07-27 17:00 UTC is Sunday 01:00 in Manila
        let ts = Utc.with_ymd_and_hms(2024, 7, 27, 17, 0, 0).unwrap();
        let table = build_features(
            &[incident("Manila", "Taft Ave", ts, "Knee Deep")],
            &[obs("Manila", ts, 1.0, "Rain")],
            manila(),
        );
        let f = &table.rows[0].features;
        assert_eq!(f.hour, 1.0);
        assert_eq!(f.day_of_week, 6.0);
        assert_eq!(f.month, 7.0);
        assert_eq!(f.is_weekend, 1.0);
    }

    #[test]
    fn test_lags_rolling_sums_and_backfill() {
        let rains = [1.0, 2.0, 0.0, 4.0];
        let weather: Vec<_> = rains
            .iter()
            .enumerate()
            .map(|(h, r)| {
                let mut o = obs("Manila", utc(h as u32), *r, "Rain");
                o.temp = 20.0 + h as f64;
                o.pressure = 1000.0 + h as f64 * 2.0;
                o
            })
            .collect();
        let table = build_features(&[incident("Manila", "Taft Ave", utc(0), "Knee Deep")], &weather, manila());
        let rows = &table.rows;
        assert_eq!(rows.len(), 4);

        // lag 1
        assert_eq!(rows[0].features.rain_lags[0], 0.0);
        assert_eq!(rows[1].features.rain_lags[0], 1.0);
        assert_eq!(rows[3].features.rain_lags[0], 0.0);
        // lag 3 reaches the first row only from index 3
        assert_eq!(rows[3].features.rain_lags[2], 1.0);
        // temperature backfill is the column mean (20+21+22+23)/4
        assert_relative_eq!(rows[0].features.temp_lags[0], 21.5);
        assert_eq!(rows[2].features.temp_lags[1], 20.0);
        // rolling sums over incomplete windows
        assert_eq!(rows[0].features.rain_sums[2], 1.0);
        assert_eq!(rows[3].features.rain_sums[1], 4.0);
        assert_eq!(rows[3].features.rain_sums[2], 6.0);
        assert_eq!(rows[3].features.rain_sums[5], 7.0);
        // pressure deltas
        assert_eq!(rows[0].features.pressure_change_1h, 0.0);
        assert_eq!(rows[1].features.pressure_change_1h, 2.0);
        assert_eq!(rows[2].features.pressure_change_3h, 0.0);
        assert_eq!(rows[3].features.pressure_change_3h, 6.0);
    }

    #[test]
    fn test_lags_do_not_cross_roads() {
        let weather: Vec<_> = (0..2).map(|h| obs("Manila", utc(h), 3.0 + h as f64, "Rain")).collect();
        let incidents = [
            incident("Manila", "A Road", utc(0), "Knee Deep"),
            incident("Manila", "B Road", utc(0), "Knee Deep"),
        ];
        let table = build_features(&incidents, &weather, manila());
        let first_b = table.rows.iter().find(|r| r.road_sector == "B Road").unwrap();
        assert_eq!(first_b.features.rain_lags[0], 0.0);
    }

    #[test]
    fn test_indicators() {
        let mut o = obs("Manila", utc(0), 5.0, "Rain");
        o.wind_speed = 10.5;
        o.wind_gust = 21.0;
        let table = build_features(&[incident("Manila", "Taft Ave", utc(0), "Knee Deep")], &[o], manila());
        let f = &table.rows[0].features;
        assert_eq!(f.is_raining, 1.0);
        assert_eq!(f.heavy_rain, 1.0);
        assert_eq!(f.very_heavy_rain, 1.0);
        assert_eq!(f.high_wind, 1.0);
        assert_eq!(f.gust_ratio, 2.0);
        assert_eq!(f.temp_range, 2.0);
    }

    #[test]
    fn test_zero_wind_gives_zero_gust_ratio() {
        let mut o = obs("Manila", utc(0), 0.0, "Clear");
        o.wind_speed = 0.0;
        let table = build_features(&[incident("Manila", "Taft Ave", utc(0), "Knee Deep")], &[o], manila());
        assert_eq!(table.rows[0].features.gust_ratio, 0.0);
        assert_eq!(table.rows[0].features.is_raining, 0.0);
    }

    #[test]
    fn test_encoders_fit_on_full_weather_corpus() {
        let table = fixture_table();
        assert_eq!(table.weather_main.classes(), &["Clouds", "Rain"]);
        assert!(table.weather_desc.code("moderate rain").is_some());
        let rain_code = table.weather_main.code("Rain").unwrap() as f64;
        assert!(table.rows.iter().filter(|r| r.weather_main == "Rain").all(|r| r.features.weather_main_encoded == rain_code));
    }

    #[test]
    fn test_schema_covers_incident_roads() {
        let table = fixture_table();
        let roads: Vec<&str> = table.schema.roads().iter().map(String::as_str).collect();
        assert_eq!(roads, vec!["EDSA", "España Blvd", "Taft Ave"]);
        assert_eq!(table.matrix()[0].len(), table.schema.len());
    }
}
