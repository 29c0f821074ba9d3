//! Layered search-and-validate resolution of place names to coordinates.
//!
//! For each name the resolver tries, in order:
//!
//! * **A** place search scoped to the city, keeping only in-bounds hits and
//!   preferring relevant ones
//! * **B** nationwide place search, re-checked against the city bounds
//! * **C** address geocoding scoped to the city
//! * **D** nationwide address geocoding, re-checked against the city bounds
//!
//! Requests go out strictly one at a time to stay under the provider's rate
//! limits. A failed request only means "no result" for that strategy.

use crate::bounds::in_bounds;
use crate::config::AmapConfig;
use crate::error::PlannerError;
use crate::geocode::{Candidate, PlaceProvider};
use crate::model::{PoiQuery, ResolvedMarker};
use crate::normalize::{clean_city_name, normalize};
use crate::similarity::is_relevant;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Default number of names attempted per batch
pub const DEFAULT_BATCH_LIMIT: usize = 12;

/// Which fallback produced a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CityPlaceSearch,
    NationwidePlaceSearch,
    CityGeocode,
    NationwideGeocode,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Strategy::CityPlaceSearch => "city place search",
            Strategy::NationwidePlaceSearch => "nationwide place search",
            Strategy::CityGeocode => "city geocode",
            Strategy::NationwideGeocode => "nationwide geocode",
        };
        f.write_str(label)
    }
}

pub struct PoiResolver {
    provider: Arc<dyn PlaceProvider>,
    limit: usize,
}

impl PoiResolver {
    pub fn new(provider: Arc<dyn PlaceProvider>) -> Self {
        Self {
            provider,
            limit: DEFAULT_BATCH_LIMIT,
        }
    }

    pub fn from_config(provider: Arc<dyn PlaceProvider>, config: &AmapConfig) -> Self {
        Self::new(provider).with_limit(config.batch_limit)
    }

    /// Cap on names attempted per batch; extra names are dropped silently
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Resolve up to `limit` names, in order, one request at a time.
    ///
    /// Unresolved names are simply absent from the result. Output markers keep
    /// the caller's original name, not the cleaned search term.
    pub async fn resolve(&self, items: &[PoiQuery]) -> Vec<ResolvedMarker> {
        if !self.provider.is_configured() {
            warn!(
                "{} has no API key configured, skipping {} names",
                self.provider.provider_name(),
                items.len()
            );
            return Vec::new();
        }

        let mut results = Vec::new();
        let mut seen = HashSet::new();
        let attempted = items.len().min(self.limit);

        for item in items.iter().take(self.limit) {
            let cleaned = normalize(&item.name);
            if cleaned.chars().count() < 2 {
                debug!("skipping '{}': name too short after cleaning", item.name);
                continue;
            }
            let city = item
                .city
                .as_deref()
                .map(clean_city_name)
                .unwrap_or_default();

            let Some(((lng, lat), strategy)) = self.resolve_one(&cleaned, &city).await else {
                debug!("no coordinates for '{}'", item.name);
                continue;
            };

            let key = format!("{}-{:.4}-{:.4}", cleaned, lng, lat);
            if seen.insert(key) {
                debug!(
                    "resolved '{}' to {},{} via {}",
                    item.name, lng, lat, strategy
                );
                results.push(ResolvedMarker::new(item.name.clone(), lng, lat));
            }
        }

        info!(
            "resolved {}/{} names ({} dropped over limit)",
            results.len(),
            attempted,
            items.len() - attempted
        );
        results
    }

    async fn resolve_one(&self, name: &str, city: &str) -> Option<((f64, f64), Strategy)> {
        let has_city = !city.is_empty();
        let city_hint = has_city.then_some(city);

        let hits = self.search(name, city).await;
        if let Some(coords) = select_candidate(&hits, name, city_hint) {
            return Some((coords, Strategy::CityPlaceSearch));
        }

        if has_city {
            let hits = self.search(name, "").await;
            if let Some(coords) = select_candidate(&hits, name, city_hint) {
                return Some((coords, Strategy::NationwidePlaceSearch));
            }

            let hits = self.geocode(name, city).await;
            if let Some(coords) = first_in_bounds(&hits, city_hint) {
                return Some((coords, Strategy::CityGeocode));
            }
        }

        let hits = self.geocode(name, "").await;
        first_in_bounds(&hits, city_hint).map(|coords| (coords, Strategy::NationwideGeocode))
    }

    async fn search(&self, name: &str, city: &str) -> Vec<Candidate> {
        swallow(self.provider.search_places(name, city).await, "place search", name)
    }

    async fn geocode(&self, name: &str, city: &str) -> Vec<Candidate> {
        swallow(self.provider.geocode(name, city).await, "geocode", name)
    }
}

fn swallow(result: Result<Vec<Candidate>, PlannerError>, what: &str, name: &str) -> Vec<Candidate> {
    result.unwrap_or_else(|e| {
        debug!("{} for '{}' failed: {}", what, name, e);
        Vec::new()
    })
}

/// First relevant in-bounds candidate, else the first in-bounds one
fn select_candidate(hits: &[Candidate], query: &str, city: Option<&str>) -> Option<(f64, f64)> {
    let located: Vec<(&Candidate, (f64, f64))> = hits
        .iter()
        .filter_map(|c| c.coordinates().map(|coords| (c, coords)))
        .filter(|(_, (lng, lat))| in_bounds(*lng, *lat, city))
        .collect();

    located
        .iter()
        .find(|(c, _)| c.name.as_deref().is_some_and(|n| is_relevant(query, n)))
        .or_else(|| located.first())
        .map(|(_, coords)| *coords)
}

/// Geocodes carry no name to score, so take the first usable in-bounds hit
fn first_in_bounds(hits: &[Candidate], city: Option<&str>) -> Option<(f64, f64)> {
    hits.first()
        .and_then(Candidate::coordinates)
        .filter(|(lng, lat)| in_bounds(*lng, *lat, city))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_prefers_relevant_in_bounds() {
        let hits = vec![
            Candidate::new(Some("故宫酒店"), "118.80,32.05"),
            Candidate::new(Some("东方明珠"), "116.40,39.91"),
            Candidate::new(Some("故宫博物院"), "116.397,39.917"),
        ];
        assert_eq!(
            select_candidate(&hits, "故宫", Some("北京")),
            Some((116.397, 39.917))
        );
    }

    #[test]
    fn test_select_falls_back_to_first_in_bounds() {
        let hits = vec![
            Candidate::new(Some("中山陵"), "118.85,32.06"),
            Candidate::new(Some("颐和园新建宫门"), "116.27,39.99"),
            Candidate::new(Some("国家体育场"), "116.39,39.99"),
        ];
        assert_eq!(
            select_candidate(&hits, "天坛", Some("北京")),
            Some((116.27, 39.99))
        );
    }

    #[test]
    fn test_select_rejects_everything_out_of_bounds() {
        let hits = vec![Candidate::new(Some("故宫博物院"), "116.397,39.917")];
        assert_eq!(select_candidate(&hits, "故宫", Some("南京")), None);
    }

    #[test]
    fn test_select_skips_unparseable_locations() {
        let hits = vec![
            Candidate {
                name: Some("夫子庙".to_string()),
                location: None,
            },
            Candidate::new(Some("夫子庙步行街"), "118.79,32.02"),
        ];
        assert_eq!(
            select_candidate(&hits, "夫子庙", None),
            Some((118.79, 32.02))
        );
    }

    #[test]
    fn test_first_in_bounds_only_looks_at_first_hit() {
        let hits = vec![
            Candidate::new(None, "116.4,39.9"),
            Candidate::new(None, "118.8,32.0"),
        ];
        assert_eq!(first_in_bounds(&hits, Some("南京")), None);
        assert_eq!(first_in_bounds(&hits, None), Some((116.4, 39.9)));
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::CityGeocode.to_string(), "city geocode");
    }
}
