use crate::config::LlmConfig;
use crate::error::PlannerError;
use crate::providers::{LlmProvider, OpenAIProvider, ProxyProvider};

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(config: &LlmConfig) -> Result<Box<dyn LlmProvider>, PlannerError> {
        match config.provider.as_str() {
            "proxy" => Ok(Box::new(ProxyProvider::new(config)?)),
            "openai" => Ok(Box::new(OpenAIProvider::new(config)?)),
            other => Err(PlannerError::BuilderError(format!(
                "Unknown provider: {}",
                other
            ))),
        }
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["proxy", "openai"]
    }
}
