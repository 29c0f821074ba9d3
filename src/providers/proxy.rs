use crate::config::LlmConfig;
use crate::error::PlannerError;
use crate::providers::{LlmProvider, Task};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the planning proxy that holds no credentials of its own.
///
/// The caller's key and upstream base URL travel in `x-llm-api-key` and
/// `x-llm-api-base` headers; the proxy answers `{ "text": ... }`.
pub struct ProxyProvider {
    client: Client,
    api_key: String,
    api_base: String,
    proxy_url: String,
    model: String,
}

#[derive(Serialize)]
struct ProxyRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct ProxyResponse {
    #[serde(default)]
    text: Option<String>,
}

impl ProxyProvider {
    /// Create a new proxy provider from configuration
    pub fn new(config: &LlmConfig) -> Result<Self, PlannerError> {
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| PlannerError::MissingCredentials("llm".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(ProxyProvider {
            client,
            api_key,
            api_base: config.base_url.clone(),
            proxy_url: config.proxy_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    #[doc(hidden)]
    pub fn with_proxy_url(api_key: String, proxy_url: String, model: String) -> Self {
        ProxyProvider {
            client: Client::new(),
            api_key,
            api_base: LlmConfig::default().base_url,
            proxy_url,
            model,
        }
    }
}

#[async_trait]
impl LlmProvider for ProxyProvider {
    fn provider_name(&self) -> &str {
        "proxy"
    }

    async fn complete(&self, task: Task, prompt: &str) -> Result<String, PlannerError> {
        let response = self
            .client
            .post(format!("{}{}", self.proxy_url, task.route()))
            .header("x-llm-api-key", &self.api_key)
            .header("x-llm-api-base", &self.api_base)
            .json(&ProxyRequest {
                model: &self.model,
                prompt,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlannerError::ProviderError(format!(
                "proxy request failed with status {}: {}",
                status, body
            )));
        }

        let body: ProxyResponse = response.json().await?;
        let text = body.text.unwrap_or_default();
        debug!("proxy returned {} bytes for {:?}", text.len(), task);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_complete_plan_through_proxy() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/llm/plan")
            .match_header("x-llm-api-key", "user-key")
            .match_header("x-llm-api-base", Matcher::Any)
            .match_body(Matcher::Json(json!({"model": "qwen-max", "prompt": "去杭州"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"text": "第1天：西湖"}"#)
            .create_async()
            .await;

        let provider = ProxyProvider::with_proxy_url(
            "user-key".to_string(),
            server.url(),
            "qwen-max".to_string(),
        );
        let text = provider.complete(Task::Plan, "去杭州").await.unwrap();

        assert_eq!(text, "第1天：西湖");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_budget_route_and_missing_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/llm/budget")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let provider = ProxyProvider::with_proxy_url(
            "user-key".to_string(),
            server.url(),
            "qwen-max".to_string(),
        );
        let text = provider.complete(Task::Budget, "plan").await.unwrap();

        assert!(text.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_proxy_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/llm/plan")
            .with_status(400)
            .with_body(r#"{"error": "Missing x-llm-api-key"}"#)
            .create_async()
            .await;

        let provider =
            ProxyProvider::with_proxy_url(String::new(), server.url(), "qwen-max".to_string());
        let result = provider.complete(Task::Plan, "去杭州").await;

        match result {
            Err(PlannerError::ProviderError(message)) => {
                assert!(message.contains("400"));
                assert!(message.contains("Missing x-llm-api-key"));
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }
}
