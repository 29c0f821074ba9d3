mod amap;

pub use amap::AmapClient;

use crate::error::PlannerError;
use async_trait::async_trait;

/// One hit from a place search or address geocode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    /// Place name; address geocodes usually have none
    pub name: Option<String>,
    /// Raw `"lng,lat"` pair as returned by the service
    pub location: Option<String>,
}

impl Candidate {
    pub fn new(name: Option<&str>, location: &str) -> Self {
        Self {
            name: name.map(str::to_string),
            location: Some(location.to_string()),
        }
    }

    /// Parsed coordinates, if the location is a usable `"lng,lat"` pair
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.location.as_deref().and_then(parse_location)
    }
}

/// Parse a `"lng,lat"` pair, rejecting non-finite and non-positive values
pub fn parse_location(location: &str) -> Option<(f64, f64)> {
    let (lng, lat) = location.split_once(',')?;
    let lng: f64 = lng.trim().parse().ok()?;
    let lat: f64 = lat.trim().parse().ok()?;
    if lng.is_finite() && lat.is_finite() && lng > 0.0 && lat > 0.0 {
        Some((lng, lat))
    } else {
        None
    }
}

/// Place search and address geocoding service
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Get the provider name (e.g., "amap")
    fn provider_name(&self) -> &str;

    /// Whether credentials are present; an unconfigured provider is never called
    fn is_configured(&self) -> bool {
        true
    }

    /// Keyword place search, optionally scoped to a city (empty = nationwide)
    async fn search_places(
        &self,
        keywords: &str,
        city: &str,
    ) -> Result<Vec<Candidate>, PlannerError>;

    /// Structured address geocoding, optionally scoped to a city
    async fn geocode(&self, address: &str, city: &str) -> Result<Vec<Candidate>, PlannerError>;
}
