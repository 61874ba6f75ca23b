//! Shared synthetic data for the integration tests.
//!
//! Two cities, three roads. Rain comes in bursts on a 12-hour cycle and
//! every hour with at least 5 mm floods that city's roads, so rainfall
//! alone separates the classes.

#![allow(dead_code)]

use flopred_service::pipeline::PipelineSettings;
use flopred_service::storage::MemoryStore;
use flopred_service::training::TrainingConfig;
use std::sync::Arc;

pub const INCIDENTS: &str = "flooded_roads_phase1.csv";
pub const WEATHER: &str = "weather_all_months_hourly.csv";

const ROADS: [(&str, &str); 3] = [("Manila", "España Blvd"), ("Manila", "Taft Ave"), ("Quezon City", "EDSA")];
const CITIES: [&str; 2] = ["Manila", "Quezon City"];

fn rain_at(h: usize) -> f64 {
    match h % 12 {
        3 => 6.5,
        4 => 9.0,
        5 => 2.0,
        9 => 0.4,
        _ => 0.0,
    }
}

fn stamp(h: usize) -> String {
    format!("2024-08-{:02} {:02}:00:00", 1 + h / 24, h % 24)
}

pub fn weather_csv(hours: usize) -> String {
    let mut csv = String::from(
        "datetime,city,main.temp,main.pressure,main.humidity,wind.speed,rain.1h,weather.main,weather.description\n",
    );
    for h in 0..hours {
        for (c, city) in CITIES.iter().enumerate() {
            let rain = rain_at(h + c * 2);
            let (main, desc) = if rain > 0.0 { ("Rain", "moderate rain") } else { ("Clouds", "broken clouds") };
            csv.push_str(&format!(
                "{},{},{:.1},{:.1},{:.1},{:.1},{:.1},{},{}\n",
                stamp(h),
                city,
                27.0 - rain * 0.2,
                1008.0 - rain,
                80.0 + rain * 2.0,
                3.0 + rain * 0.5,
                rain,
                main,
                desc
            ));
        }
    }
    csv
}

/// Incidents matching `weather_csv(hours)`.
pub fn incidents_csv(hours: usize) -> String {
    let mut csv = String::from("datetime,City,Road_Sector,Location,Flood Type/Depth,latitude,longitude\n");
    for h in 0..hours {
        for (c, city) in CITIES.iter().enumerate() {
            let rain = rain_at(h + c * 2);
            if rain < 5.0 {
                continue;
            }
            let depth = if rain >= 8.0 { "Waist Deep" } else { "Knee Deep" };
            for (road_city, road) in ROADS.iter().filter(|(rc, _)| rc == city) {
                csv.push_str(&format!(
                    "{},{},{},{},{},14.60,121.00\n",
                    stamp(h).replace(":00:00", ":20:00"),
                    road_city,
                    road,
                    road,
                    depth
                ));
            }
        }
    }
    csv
}

/// Incidents that fall outside the weather window: every row is negative.
pub fn out_of_window_incidents_csv() -> String {
    "datetime,City,Road_Sector,Location,Flood Type/Depth\n\
     2023-01-05 10:20:00,Manila,España Blvd,España Blvd,Knee Deep\n\
     2023-01-05 11:20:00,Manila,Taft Ave,Taft Ave,Gutter Deep\n\
     2023-01-06 09:20:00,Quezon City,EDSA,EDSA,Knee Deep\n"
        .to_string()
}

pub fn store_with(incidents: String, weather: String) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert(INCIDENTS, incidents);
    store.insert(WEATHER, weather);
    store
}

pub fn settings() -> PipelineSettings {
    PipelineSettings {
        incidents_table: INCIDENTS.to_string(),
        weather_table: WEATHER.to_string(),
        timezone: chrono_tz::Asia::Manila,
        training: TrainingConfig {
            forest_trees: 10,
            boosting_iterations: 15,
            logistic_max_iterations: 300,
            ..TrainingConfig::default()
        },
        local_copy: None,
    }
}
