use crate::bounds::in_bounds;
use crate::model::{ItinerarySummary, PoiQuery, ResolvedMarker};
use crate::normalize::name_key;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Map each mentioned place (by [`name_key`]) to the first day it appears on.
///
/// A day without a `day` number takes its 1-based position in the list.
pub fn build_day_index(summary: &ItinerarySummary) -> HashMap<String, u32> {
    let mut index = HashMap::new();
    for (position, day) in summary.days.iter().enumerate() {
        let day_number = day.day.unwrap_or(position as u32 + 1);
        let names: Vec<&str> = match (&day.poi_list, &day.items) {
            (Some(pois), _) => pois.iter().map(|p| p.name.as_str()).collect(),
            (None, Some(items)) => items.iter().filter_map(|i| i.label()).collect(),
            (None, None) => Vec::new(),
        };
        for name in names {
            let key = name_key(name);
            if !key.is_empty() {
                index.entry(key).or_insert(day_number);
            }
        }
    }
    index
}

/// Insertion-ordered marker collection where the first marker for a name wins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    markers: Vec<ResolvedMarker>,
    keys: HashSet<String>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a marker unless one with the same name is already present
    pub fn insert(&mut self, marker: ResolvedMarker) -> bool {
        let key = name_key(&marker.name);
        if key.is_empty() || !self.keys.insert(key) {
            return false;
        }
        self.markers.push(marker);
        true
    }

    /// Merge markers in order, returning how many were new
    pub fn merge<I: IntoIterator<Item = ResolvedMarker>>(&mut self, markers: I) -> usize {
        let mut added = 0;
        for marker in markers {
            if self.insert(marker) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn as_slice(&self) -> &[ResolvedMarker] {
        &self.markers
    }

    pub fn into_vec(self) -> Vec<ResolvedMarker> {
        self.markers
    }
}

impl FromIterator<ResolvedMarker> for MarkerSet {
    fn from_iter<I: IntoIterator<Item = ResolvedMarker>>(iter: I) -> Self {
        let mut set = MarkerSet::new();
        set.merge(iter);
        set
    }
}

/// A name-only POI waiting on the resolver, with the day it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPoi {
    pub query: PoiQuery,
    pub day: Option<u32>,
}

/// Split the summary's POI list into ready markers and names to resolve.
///
/// Entries with usable coordinates inside their city's bounds become markers
/// immediately; the rest, including zero placeholders and wrong-city
/// coordinates, are returned for the resolver. Days come from the entry
/// itself or else the day index.
pub fn partition_pois(summary: &ItinerarySummary) -> (MarkerSet, Vec<PendingPoi>) {
    let index = build_day_index(summary);
    let mut ready = MarkerSet::new();
    let mut pending = Vec::new();

    for poi in &summary.poi_list {
        let day = poi.day.or_else(|| index.get(&name_key(&poi.name)).copied());
        let city = poi.city.as_deref();
        let located = poi.coordinates().filter(|(lng, lat)| {
            let inside = in_bounds(*lng, *lat, city);
            if !inside {
                debug!(
                    "'{}' at {},{} is outside {:?}, geocoding instead",
                    poi.name, lng, lat, city
                );
            }
            inside
        });
        match located {
            Some((lng, lat)) => {
                ready.insert(ResolvedMarker::new(poi.name.clone(), lng, lat).with_day(day));
            }
            None => pending.push(PendingPoi {
                query: PoiQuery::from(poi),
                day,
            }),
        }
    }
    (ready, pending)
}

/// Attach days to freshly resolved markers using the pending entries they came from
pub fn bind_days(resolved: Vec<ResolvedMarker>, pending: &[PendingPoi]) -> Vec<ResolvedMarker> {
    resolved
        .into_iter()
        .map(|marker| {
            let day = pending
                .iter()
                .find(|p| p.query.name == marker.name)
                .and_then(|p| p.day);
            marker.with_day(day)
        })
        .collect()
}

#[derive(Debug, Default)]
struct BoardState {
    generation: u64,
    markers: MarkerSet,
}

/// The live marker set shown on the map.
///
/// Every [`reset`](MarkerBoard::reset) starts a new generation. Background
/// resolver batches carry the generation they were issued under and are only
/// merged while it is still current, so a slow batch for an itinerary the
/// user already left can never resurrect its markers.
#[derive(Debug, Clone, Default)]
pub struct MarkerBoard {
    state: Arc<Mutex<BoardState>>,
}

impl MarkerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all markers and start a new generation
    pub async fn reset(&self, markers: MarkerSet) -> u64 {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.markers = markers;
        debug!(
            "marker board generation {} with {} markers",
            state.generation,
            state.markers.len()
        );
        state.generation
    }

    /// Merge a batch into the current markers if `generation` is still live.
    ///
    /// Existing markers are never overwritten. Returns false when the batch
    /// was discarded as stale.
    pub async fn merge(&self, generation: u64, markers: Vec<ResolvedMarker>) -> bool {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(
                "discarding {} markers from stale generation {} (current {})",
                markers.len(),
                generation,
                state.generation
            );
            return false;
        }
        let added = state.markers.merge(markers);
        debug!("merged {} new markers into generation {}", added, generation);
        true
    }

    pub async fn generation(&self) -> u64 {
        self.state.lock().await.generation
    }

    pub async fn snapshot(&self) -> Vec<ResolvedMarker> {
        self.state.lock().await.markers.as_slice().to_vec()
    }
}
