pub mod bounds;
pub mod budget;
pub mod config;
pub mod error;
pub mod extract;
pub mod geocode;
pub mod markers;
pub mod model;
pub mod normalize;
pub mod planner;
pub mod providers;
pub mod resolver;
pub mod similarity;
pub mod sink;
pub mod store;

use std::sync::Arc;

use log::debug;

pub use budget::{
    compare_with_plan, parse_budget, spent_by_category, total_spent, BudgetEstimate, BudgetItem,
    CategoryComparison,
};
pub use config::{AmapConfig, LlmConfig, PlannerConfig};
pub use error::PlannerError;
pub use extract::{extract_json, extract_summary};
pub use geocode::{AmapClient, Candidate, PlaceProvider};
pub use markers::{build_day_index, MarkerBoard, MarkerSet};
pub use model::{ItinerarySummary, PoiQuery, RawPoi, ResolvedMarker};
pub use normalize::{clean_city_name, normalize};
pub use planner::{PlanOutcome, PlannerBuilder, RefreshHandle, TripPlanner};
pub use providers::{LlmProvider, ProviderFactory};
pub use resolver::PoiResolver;
pub use similarity::{is_relevant, similarity};
pub use sink::{MapSink, RouteRequest};
pub use store::{Expense, ItineraryStore, MemoryStore, SavedItinerary};

/// Extract the summary from a model response, empty if there is none
pub fn summary_from_text(text: &str) -> ItinerarySummary {
    extract_summary(text).unwrap_or_default()
}

/// Resolve every POI of a summary with the given place provider and wait for the result.
///
/// Entries that already have coordinates come first, followed by the
/// geocoded ones. Markers are deduplicated by name and carry their day.
pub async fn resolve_summary(
    summary: &ItinerarySummary,
    resolver: &PoiResolver,
) -> Vec<ResolvedMarker> {
    let (mut placed, pending) = markers::partition_pois(summary);
    debug!(
        "{} markers ready, {} names to resolve",
        placed.len(),
        pending.len()
    );

    if !pending.is_empty() {
        let queries: Vec<PoiQuery> = pending.iter().map(|p| p.query.clone()).collect();
        let resolved = resolver.resolve(&queries).await;
        placed.merge(markers::bind_days(resolved, &pending));
    }
    placed.into_vec()
}

/// Extract and resolve an itinerary text against AMap using `config`
pub async fn resolve_itinerary_text(
    text: &str,
    config: &PlannerConfig,
) -> Result<Vec<ResolvedMarker>, PlannerError> {
    let places: Arc<dyn PlaceProvider> = Arc::new(AmapClient::new(&config.amap)?);
    let resolver = PoiResolver::from_config(places, &config.amap);
    Ok(resolve_summary(&summary_from_text(text), &resolver).await)
}
