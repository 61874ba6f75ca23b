/// Test fixtures: representative CSV exports of the two raw tables.
///
/// The incident export mirrors the road-flooding advisory sheet:
///   datetime, City, Road_Sector, Location, Flood Type/Depth, Passability,
///   latitude, longitude
/// Header case is inconsistent in the real export; the fixtures keep it.
///
/// The weather export is the OpenWeather hourly dump flattened with dotted
/// column names (`main.temp`, `wind.speed`, `rain.1h`, ...). Rainfall is
/// blank or "n/a" for dry hours.

/// Five incident rows across two cities; the last row has a datetime the
/// parser must reject.
#[cfg(test)]
pub(crate) fn fixture_incidents_csv() -> &'static str {
    "datetime,City,Road_Sector,Location,Flood Type/Depth,Passability,latitude,longitude\n\
     2024-07-24 08:15:00,Manila,España Blvd,España Blvd,Knee Deep,Not passable to light vehicles,14.6091,120.9890\n\
     2024-07-24 08:40:00,Manila,España Blvd,España Blvd,Waist Deep,Not passable to all vehicles,14.6091,120.9890\n\
     2024-07-24 09:05:00,Manila,Taft Ave,Taft Ave,Gutter Deep,Passable to all vehicles,,\n\
     2024-07-24 10:00:00,Quezon City,EDSA,EDSA Kamuning,Half Knee Deep,Passable to all vehicles,14.6298,121.0437\n\
     not a date,Quezon City,EDSA,EDSA Kamuning,Knee Deep,,14.6298,121.0437\n"
}

/// Three hours of weather for Manila, two for Quezon City.
#[cfg(test)]
pub(crate) fn fixture_weather_csv() -> &'static str {
    "datetime,city,main.temp,main.feels_like,main.temp_min,main.temp_max,main.pressure,main.humidity,wind.speed,wind.gust,clouds.all,rain.1h,weather.main,weather.description\n\
     2024-07-24 07:00:00,Manila,27.1,30.2,26.5,27.8,1004,89,4.1,7.2,90,n/a,Clouds,overcast clouds\n\
     2024-07-24 08:00:00,Manila,26.4,29.0,26.0,27.0,1003,93,6.3,11.5,100,7.8,Rain,heavy intensity rain\n\
     2024-07-24 09:00:00,Manila,26.0,28.6,25.7,26.4,1002,95,5.2,9.1,100,3.1,Rain,moderate rain\n\
     2024-07-24 08:00:00,Quezon City,25.9,28.7,25.5,26.6,1003,94,5.8,10.2,100,6.4,Rain,heavy intensity rain\n\
     2024-07-24 10:00:00,Quezon City,26.2,29.1,25.9,26.8,1003,92,4.0,,100,,Clouds,overcast clouds\n"
}

/// Deterministic multi-day dataset large enough to train on.
///
/// Three roads in two cities. Rain arrives in bursts; every burst of at
/// least 5 mm floods the roads of that city in the same hour, so the label
/// is learnable from rainfall alone.
#[cfg(test)]
pub(crate) fn fixture_training_csvs(hours: usize) -> (String, String) {
    let roads = [("Manila", "España Blvd"), ("Manila", "Taft Ave"), ("Quezon City", "EDSA")];
    let cities = ["Manila", "Quezon City"];

    let mut incidents = String::from("datetime,City,Road_Sector,Location,Flood Type/Depth\n");
    let mut weather = String::from(
        "datetime,city,main.temp,main.feels_like,main.temp_min,main.temp_max,main.pressure,\
         main.humidity,wind.speed,wind.gust,clouds.all,rain.1h,weather.main,weather.description\n",
    );

    for h in 0..hours {
        let day = 1 + h / 24;
        let hour = h % 24;
        let stamp = format!("2024-07-{:02} {:02}:00:00", day, hour);

        for (c, city) in cities.iter().enumerate() {
            let rain = synthetic_rain(h + c * 2);
            let (main, desc) = if rain >= 5.0 {
                ("Rain", "heavy intensity rain")
            } else if rain > 0.0 {
                ("Rain", "light rain")
            } else {
                ("Clouds", "overcast clouds")
            };
            let temp = 27.0 - rain * 0.2 + (hour as f64 - 12.0).abs() * -0.1;
            weather.push_str(&format!(
                "{},{},{:.1},{:.1},{:.1},{:.1},{},{},{:.1},{:.1},{},{:.1},{},{}\n",
                stamp,
                city,
                temp,
                temp + 3.0,
                temp - 0.5,
                temp + 0.5,
                1008.0 - rain,
                80.0 + rain * 2.0,
                3.0 + rain * 0.5,
                5.0 + rain,
                if rain > 0.0 { 100 } else { 60 },
                rain,
                main,
                desc
            ));

            if rain >= 5.0 {
                for (road_city, road) in roads.iter().filter(|(rc, _)| rc == city) {
                    let depth = if rain >= 8.0 { "Waist Deep" } else { "Knee Deep" };
                    incidents.push_str(&format!(
                        "2024-07-{:02} {:02}:20:00,{},{},{},{}\n",
                        day, hour, road_city, road, road, depth
                    ));
                }
            }
        }
    }
    (incidents, weather)
}

#[cfg(test)]
fn synthetic_rain(h: usize) -> f64 {
    match h % 12 {
        3 => 6.5,
        4 => 9.0,
        5 => 2.0,
        9 => 0.4,
        _ => 0.0,
    }
}
