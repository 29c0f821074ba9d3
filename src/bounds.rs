//! Reference rectangles for known cities and the in-bounds check that
//! rejects geocodes landing in the wrong city.

use crate::normalize::clean_city_name;

/// Approximate bounding rectangle for one city, in GCJ-02 degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityBounds {
    pub city: &'static str,
    pub lng_range: (f64, f64),
    pub lat_range: (f64, f64),
}

impl CityBounds {
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        lng >= self.lng_range.0
            && lng <= self.lng_range.1
            && lat >= self.lat_range.0
            && lat <= self.lat_range.1
    }
}

// Hand-measured and deliberately loose. Tightening or extending this table
// changes which markers survive, so treat edits as a policy change.
pub const CITY_BOUNDS: &[CityBounds] = &[
    CityBounds { city: "南京", lng_range: (118.3, 119.2), lat_range: (31.2, 32.6) },
    CityBounds { city: "北京", lng_range: (116.0, 117.0), lat_range: (39.5, 41.0) },
    CityBounds { city: "上海", lng_range: (120.8, 122.0), lat_range: (30.7, 31.9) },
    CityBounds { city: "广州", lng_range: (113.0, 113.6), lat_range: (22.7, 23.4) },
    CityBounds { city: "深圳", lng_range: (113.7, 114.6), lat_range: (22.4, 22.9) },
    CityBounds { city: "杭州", lng_range: (119.5, 120.5), lat_range: (30.0, 30.5) },
    CityBounds { city: "成都", lng_range: (103.8, 104.5), lat_range: (30.4, 30.9) },
    CityBounds { city: "西安", lng_range: (108.7, 109.2), lat_range: (34.1, 34.5) },
    CityBounds { city: "苏州", lng_range: (120.3, 121.0), lat_range: (31.1, 31.5) },
    CityBounds { city: "武汉", lng_range: (114.0, 114.6), lat_range: (30.3, 30.8) },
];

/// Look up the rectangle for a city label, cleaning it first
pub fn bounds_for(city: &str) -> Option<&'static CityBounds> {
    let name = clean_city_name(city);
    if name.is_empty() {
        return None;
    }
    CITY_BOUNDS.iter().find(|b| b.city == name)
}

/// Whether a coordinate plausibly lies in `city`.
///
/// Unknown or empty cities always pass: a missing table entry must not
/// silently drop an otherwise valid place.
pub fn in_bounds(lng: f64, lat: f64, city: Option<&str>) -> bool {
    match city.and_then(bounds_for) {
        Some(bounds) => bounds.contains(lng, lat),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_city_accepts_inside() {
        assert!(in_bounds(118.8, 32.0, Some("南京")));
        assert!(in_bounds(116.397, 39.909, Some("北京市")));
    }

    #[test]
    fn test_known_city_rejects_other_city() {
        // Beijing's coordinates under a Nanjing label
        assert!(!in_bounds(116.4, 39.9, Some("南京")));
    }

    #[test]
    fn test_edges_are_inclusive() {
        assert!(in_bounds(118.3, 31.2, Some("南京")));
        assert!(in_bounds(119.2, 32.6, Some("南京")));
    }

    #[test]
    fn test_unknown_or_missing_city_is_permissive() {
        assert!(in_bounds(0.1, 0.1, None));
        assert!(in_bounds(0.1, 0.1, Some("")));
        assert!(in_bounds(100.0, 25.0, Some("大理")));
    }

    #[test]
    fn test_bounds_for_cleans_label() {
        assert_eq!(bounds_for("江苏省南京市").map(|b| b.city), Some("南京"));
        assert!(bounds_for("拉萨").is_none());
    }
}
