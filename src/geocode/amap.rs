use crate::config::AmapConfig;
use crate::error::PlannerError;
use crate::geocode::{Candidate, PlaceProvider};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Client for the AMap web service place search and geocoding endpoints
pub struct AmapClient {
    client: Client,
    key: Option<String>,
    base_url: String,
    page_size: u32,
}

impl AmapClient {
    /// Create a new client from configuration
    pub fn new(config: &AmapConfig) -> Result<Self, PlannerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(AmapClient {
            client,
            key: config.resolved_key(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(key: Option<String>, base_url: String) -> Self {
        AmapClient {
            client: Client::new(),
            key,
            base_url,
            page_size: 10,
        }
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, PlannerError> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| PlannerError::MissingCredentials("amap".to_string()))?;

        let mut query = vec![("key", key)];
        query.extend_from_slice(params);

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&query)
            .send()
            .await?
            .error_for_status()?;

        let data: Value = response.json().await?;
        check_status(&data)?;
        Ok(data)
    }
}

/// AMap reports failures in-band: HTTP 200 with `status: "0"`
fn check_status(data: &Value) -> Result<(), PlannerError> {
    match data.get("status").and_then(|s| s.as_str()) {
        Some("1") | None => Ok(()),
        Some(status) => Err(PlannerError::MapServiceError {
            status: status.to_string(),
            info: data
                .get("infocode")
                .or_else(|| data.get("info"))
                .and_then(|i| i.as_str())
                .unwrap_or("unknown")
                .to_string(),
        }),
    }
}

fn candidates(data: &Value, field: &str) -> Vec<Candidate> {
    data.get(field)
        .and_then(|list| list.as_array())
        .map(|list| {
            list.iter()
                .map(|raw| Candidate {
                    name: raw.get("name").and_then(|n| n.as_str()).map(str::to_string),
                    // empty locations come back as [] rather than ""
                    location: raw
                        .get("location")
                        .and_then(|l| l.as_str())
                        .map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl PlaceProvider for AmapClient {
    fn provider_name(&self) -> &str {
        "amap"
    }

    fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    async fn search_places(
        &self,
        keywords: &str,
        city: &str,
    ) -> Result<Vec<Candidate>, PlannerError> {
        let offset = self.page_size.to_string();
        let data = self
            .get(
                "/v3/place/text",
                &[
                    ("keywords", keywords),
                    ("city", city),
                    ("offset", offset.as_str()),
                    ("page", "1"),
                    ("types", ""),
                ],
            )
            .await?;
        let pois = candidates(&data, "pois");
        debug!("place search '{}' in '{}': {} hits", keywords, city, pois.len());
        Ok(pois)
    }

    async fn geocode(&self, address: &str, city: &str) -> Result<Vec<Candidate>, PlannerError> {
        let data = self
            .get("/v3/geocode/geo", &[("address", address), ("city", city)])
            .await?;
        let geocodes = candidates(&data, "geocodes");
        debug!("geocode '{}' in '{}': {} hits", address, city, geocodes.len());
        Ok(geocodes)
    }
}
