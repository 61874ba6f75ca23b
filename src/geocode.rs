/// Reverse geocoding: (latitude, longitude) -> city / road / neighborhood.
///
/// Nominatim reverse endpoint:
///   GET {base}/reverse?format=jsonv2&lat={lat}&lon={lon}
///
/// Response shape (fields used):
///   display_name           full address
///   address.road
///   address.city | address.town | address.municipality
///   address.suburb | address.neighbourhood
///
/// Nominatim's usage policy requires an identifying User-Agent.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::error::GeocodeError;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const USER_AGENT: &str = "flood_app";

/// Resolved area; any part may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub city: Option<String>,
    pub road: Option<String>,
    pub neighborhood: Option<String>,
    pub full_address: Option<String>,
}

impl Area {
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.road.is_none() && self.neighborhood.is_none() && self.full_address.is_none()
    }
}

pub trait ReverseGeocoder: Send + Sync {
    fn reverse(&self, latitude: f64, longitude: f64) -> Result<Area, GeocodeError>;
}

/// Reverse geocode, logging and swallowing failures as an empty area.
pub fn resolve_area(geocoder: &dyn ReverseGeocoder, latitude: f64, longitude: f64) -> Area {
    match geocoder.reverse(latitude, longitude) {
        Ok(area) => area,
        Err(e) => {
            warn!(latitude, longitude, error = %e, "reverse geocoding failed");
            Area::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Nominatim
// ---------------------------------------------------------------------------

pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn reverse_url(&self, latitude: f64, longitude: f64) -> String {
        format!("{}/reverse?format=jsonv2&lat={}&lon={}", self.base_url, latitude, longitude)
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    fn reverse(&self, latitude: f64, longitude: f64) -> Result<Area, GeocodeError> {
        let response = self
            .client
            .get(self.reverse_url(latitude, longitude))
            .header("Accept", "application/json")
            .send()?;

        if !response.status().is_success() {
            return Err(GeocodeError::Http(response.status().as_u16()));
        }

        let body: NominatimResponse = response.json()?;
        Ok(body.into_area())
    }
}

#[derive(Debug, Default, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    municipality: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,
}

impl NominatimResponse {
    fn into_area(self) -> Area {
        let a = self.address;
        Area {
            city: a.city.or(a.town).or(a.municipality),
            road: a.road,
            neighborhood: a.suburb.or(a.neighbourhood),
            full_address: self.display_name,
        }
    }
}

/// Geocoder that returns the same area for every point.
#[derive(Debug, Clone, Default)]
pub struct FixedGeocoder {
    pub area: Area,
}

impl ReverseGeocoder for FixedGeocoder {
    fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<Area, GeocodeError> {
        Ok(self.area.clone())
    }
}
