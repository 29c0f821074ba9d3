//! Pull the structured JSON summary out of a model's narrative response.

use crate::model::ItinerarySummary;
use log::debug;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```json(.*?)```").unwrap());

static ANY_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").unwrap());

/// Find and parse the JSON summary embedded in `text`.
///
/// Tries, in order: a ```json fenced block, any fenced block, and finally a
/// trailing `{...}` span. Parse failures fall through to the next step and
/// `None` means no summary could be recovered.
pub fn extract_json(text: &str) -> Option<Value> {
    for (label, fence) in [("json fence", &JSON_FENCE), ("plain fence", &ANY_FENCE)] {
        if let Some(body) = fence.captures(text).and_then(|c| c.get(1)) {
            match serde_json::from_str::<Value>(body.as_str().trim()) {
                Ok(value) => return Some(value),
                Err(e) => debug!("{} did not parse: {}", label, e),
            }
        }
    }

    trailing_object(text)
}

/// Slice from an opening brace to the last closing brace and parse it.
///
/// The last `{` must be closed somewhere after it, otherwise the braces are
/// unbalanced and nothing is recovered. Earlier `{` positions are then tried
/// walking back so a nested trailing object is still recovered whole.
fn trailing_object(text: &str) -> Option<Value> {
    let last_open = text.rfind('{')?;
    let close = text.rfind('}').filter(|close| *close > last_open)?;
    let mut openings: Vec<usize> = text[..=last_open]
        .match_indices('{')
        .map(|(i, _)| i)
        .collect();
    openings.reverse();

    for open in openings {
        if let Ok(value) = serde_json::from_str::<Value>(&text[open..=close]) {
            return Some(value);
        }
    }
    debug!("no parseable trailing object in {} bytes of text", text.len());
    None
}

/// Extract and interpret the itinerary summary; `None` means zero POIs
pub fn extract_summary(text: &str) -> Option<ItinerarySummary> {
    extract_json(text).map(ItinerarySummary::from_value)
}
