use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Structured summary a model appends to its narrative itinerary.
///
/// Deserialization is lenient: model output drifts from the requested shape,
/// so malformed entries are dropped instead of failing the whole summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItinerarySummary {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub days: Vec<DaySummary>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub poi_list: Vec<RawPoi>,
    #[serde(default, deserialize_with = "lenient_amounts")]
    pub budget_summary: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    #[serde(default, deserialize_with = "lenient_day")]
    pub day: Option<u32>,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub morning: Vec<String>,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub afternoon: Vec<String>,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub evening: Vec<String>,
    /// `None` when the model omitted the list altogether
    #[serde(default, deserialize_with = "lenient_opt_vec")]
    pub poi_list: Option<Vec<RawPoi>>,
    #[serde(default, deserialize_with = "lenient_opt_vec")]
    pub items: Option<Vec<DayItem>>,
}

/// Free-form activity entry some models emit instead of a per-day poiList
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time_of_day: Option<String>,
}

impl DayItem {
    pub fn label(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.title.as_deref().filter(|t| !t.is_empty()))
    }
}

/// A place mention exactly as the model produced it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPoi {
    #[serde(default, deserialize_with = "lenient_string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_day")]
    pub day: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lng: Option<f64>,
}

impl RawPoi {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Both coordinates present as finite, positive numbers.
    ///
    /// Models emit `0, 0` as a placeholder, so zero counts as missing.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lng, self.lat) {
            (Some(lng), Some(lat))
                if lng.is_finite() && lat.is_finite() && lng > 0.0 && lat > 0.0 =>
            {
                Some((lng, lat))
            }
            _ => None,
        }
    }
}

/// One pin handed to the map sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMarker {
    pub name: String,
    pub lng: f64,
    pub lat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl ResolvedMarker {
    pub fn new(name: impl Into<String>, lng: f64, lat: f64) -> Self {
        Self {
            name: name.into(),
            lng,
            lat,
            day: None,
        }
    }

    pub fn with_day(mut self, day: Option<u32>) -> Self {
        self.day = day;
        self
    }
}

/// A name the resolver should look up, with its city hint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoiQuery {
    pub name: String,
    pub city: Option<String>,
}

impl PoiQuery {
    pub fn new(name: impl Into<String>, city: Option<&str>) -> Self {
        Self {
            name: name.into(),
            city: city.map(str::to_string),
        }
    }
}

impl From<&RawPoi> for PoiQuery {
    fn from(poi: &RawPoi) -> Self {
        Self {
            name: poi.name.clone(),
            city: poi.city.clone(),
        }
    }
}

impl ItinerarySummary {
    /// Build a summary from an extracted JSON value; non-objects yield an empty summary
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty() && self.poi_list.is_empty()
    }
}

fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    Ok(lenient_opt_vec(deserializer)?.unwrap_or_default())
}

fn lenient_opt_vec<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(entries)) => Some(
            entries
                .into_iter()
                .filter_map(|entry| serde_json::from_value(entry).ok())
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_amounts<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(category, amount)| amount.as_f64().map(|a| (category, a)))
            .collect(),
        _ => BTreeMap::new(),
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    // Only real JSON numbers count; "116.4" strings are treated as missing
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| v.as_f64()))
}

fn lenient_day<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_u64())
        .and_then(|d| u32::try_from(d).ok()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => vec![s],
        Some(Value::Array(entries)) => entries
            .into_iter()
            .filter_map(|e| match e {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
