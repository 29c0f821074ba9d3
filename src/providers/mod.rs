mod factory;
mod open_ai;
mod prompt;
mod proxy;

pub use factory::ProviderFactory;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_budget_prompt, build_itinerary_prompt, ITINERARY_PROMPT};
pub use proxy::ProxyProvider;

use crate::error::PlannerError;
use async_trait::async_trait;

/// What the model is being asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Narrative itinerary with an embedded JSON summary
    Plan,
    /// Strict JSON budget estimate
    Budget,
}

impl Task {
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Task::Plan => "You are a helpful Chinese travel planning assistant.",
            Task::Budget => "You are an assistant that outputs strict JSON budgets for travel.",
        }
    }

    /// Proxy route handling this task
    pub fn route(&self) -> &'static str {
        match self {
            Task::Plan => "/api/llm/plan",
            Task::Budget => "/api/llm/budget",
        }
    }
}

/// Unified trait for all language-model backends
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "proxy", "openai")
    fn provider_name(&self) -> &str;

    /// Send a fully built prompt and return the model's raw text
    async fn complete(&self, task: Task, prompt: &str) -> Result<String, PlannerError>;
}
