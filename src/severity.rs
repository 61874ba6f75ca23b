/// Historical severity heuristic.
///
/// Independent of the classifier: looks up the last raw incident row for
/// a (city, location) and scores its depth label.
///
///   Gutter Deep  0.3   -> Light
///   Knee Deep    0.5   -> Moderate
///   Waist Deep   0.7   -> Severe
///   Flooded      1.0   -> Severe
///   anything else 0    -> No Flood

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::DataError;
use crate::ingest::Table;
use crate::ingest::records::{COL_CITY, COL_DEPTH, COL_LOCATION, COL_ROAD_SECTOR};
use crate::model::DepthCategory;

pub const LABEL_SEVERE: &str = "Severe";
pub const LABEL_MODERATE: &str = "Moderate";
pub const LABEL_LIGHT: &str = "Light";
pub const LABEL_NO_FLOOD: &str = "No Flood";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Severity {
    pub score: f64,
    pub label: String,
}

impl Severity {
    pub fn none() -> Self {
        Self::from_score(0.0)
    }

    pub fn from_score(score: f64) -> Self {
        Self { score, label: severity_label(score).to_string() }
    }
}

/// Score for a reported depth label.
pub fn depth_score(depth: &str) -> f64 {
    match DepthCategory::parse(depth) {
        Some(DepthCategory::Gutter) => 0.3,
        Some(DepthCategory::Knee) => 0.5,
        Some(DepthCategory::Waist) => 0.7,
        Some(DepthCategory::Flooded) => 1.0,
        _ => 0.0,
    }
}

pub fn severity_label(score: f64) -> &'static str {
    if score >= 0.7 {
        LABEL_SEVERE
    } else if score >= 0.4 {
        LABEL_MODERATE
    } else if score > 0.0 {
        LABEL_LIGHT
    } else {
        LABEL_NO_FLOOD
    }
}

/// Last reported depth per (city, location).
#[derive(Debug, Clone, Default)]
pub struct SeverityIndex {
    latest: HashMap<(String, String), String>,
}

impl SeverityIndex {
    /// Indexes every raw incident row; later rows override earlier ones at
    /// the same key. Timestamps are not parsed, so rows the training
    /// adapter would drop still count here. The key is `location`, or
    /// `road_sector` when the table has no `location` column.
    pub fn from_table(table: &Table, name: &str) -> Result<Self, DataError> {
        let missing = |column: &str| DataError::MissingColumn { table: name.to_string(), column: column.to_string() };
        let city = table.column_index(COL_CITY).ok_or_else(|| missing(COL_CITY))?;
        let depth = table.column_index(COL_DEPTH).ok_or_else(|| missing(COL_DEPTH))?;
        let key = table
            .first_column_of(&[COL_LOCATION, COL_ROAD_SECTOR])
            .ok_or_else(|| missing(COL_LOCATION))?;

        let mut latest = HashMap::new();
        for row in table.rows() {
            let (Some(city), Some(location)) = (row.at(city), row.at(key)) else {
                continue;
            };
            latest.insert(
                (city.to_string(), location.to_string()),
                row.at(depth).unwrap_or_default().to_string(),
            );
        }
        Ok(Self { latest })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    pub fn severity(&self, city: &str, location: &str) -> Severity {
        self.latest
            .get(&(city.to_string(), location.to_string()))
            .map(|depth| Severity::from_score(depth_score(depth)))
            .unwrap_or_else(Severity::none)
    }
}
