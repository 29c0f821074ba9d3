use crate::config::LlmConfig;
use crate::error::PlannerError;
use crate::providers::{LlmProvider, Task};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Direct client for any OpenAI-compatible chat completions endpoint
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAIProvider {
    /// Create a new OpenAI-compatible provider from configuration
    pub fn new(config: &LlmConfig) -> Result<Self, PlannerError> {
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| PlannerError::MissingCredentials("llm".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(OpenAIProvider {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.4,
        }
    }

    fn request_body(&self, task: Task, prompt: &str) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": task.system_prompt()},
                {"role": "user", "content": prompt}
            ],
        });
        match task {
            Task::Plan => body["temperature"] = json!(self.temperature),
            Task::Budget => {
                body["temperature"] = json!(0.2);
                body["response_format"] = json!({"type": "json_object"});
            }
        }
        body
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, task: Task, prompt: &str) -> Result<String, PlannerError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request_body(task, prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlannerError::ProviderError(format!(
                "chat completion failed with status {}: {}",
                status, body
            )));
        }

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);
        let text = response_body["choices"][0]["message"]["content"]
            .as_str()
            .or_else(|| response_body["choices"][0]["text"].as_str())
            .ok_or_else(|| {
                PlannerError::ProviderError("Failed to extract content from response".to_string())
            })?
            .to_string();

        Ok(text)
    }
}
