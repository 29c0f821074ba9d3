use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Main planner configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PlannerConfig {
    /// Language-model settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Mapping provider settings
    #[serde(default)]
    pub amap: AmapConfig,
}

/// Configuration for the language-model call
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// Which provider to use: "proxy" or "openai"
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    /// API key for authentication (can also be set via LLM_API_KEY)
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible endpoint
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Where the planning proxy listens
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    /// Model identifier (e.g., "qwen-max")
    #[serde(default = "default_model")]
    pub model: String,
    /// Temperature for itinerary generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: None,
            base_url: default_llm_base_url(),
            proxy_url: default_proxy_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Configuration for the place search and geocoding service
#[derive(Debug, Deserialize, Clone)]
pub struct AmapConfig {
    /// Web service key (can also be set via AMAP_KEY)
    pub key: Option<String>,
    /// REST API root
    #[serde(default = "default_amap_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_amap_timeout")]
    pub timeout_secs: u64,
    /// Maximum number of names resolved per batch
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,
    /// Candidates requested per place search
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for AmapConfig {
    fn default() -> Self {
        Self {
            key: None,
            base_url: default_amap_base_url(),
            timeout_secs: default_amap_timeout(),
            batch_limit: default_batch_limit(),
            page_size: default_page_size(),
        }
    }
}

impl AmapConfig {
    /// Key from config first, then the AMAP_KEY environment variable
    pub fn resolved_key(&self) -> Option<String> {
        self.key
            .clone()
            .or_else(|| std::env::var("AMAP_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

impl LlmConfig {
    /// Key from config first, then the LLM_API_KEY environment variable
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("LLM_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

// Default value functions
fn default_llm_provider() -> String {
    "proxy".to_string()
}

fn default_llm_base_url() -> String {
    "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string()
}

fn default_proxy_url() -> String {
    "http://localhost:8787".to_string()
}

fn default_model() -> String {
    "qwen-max".to_string()
}

fn default_temperature() -> f32 {
    0.4
}

fn default_llm_timeout() -> u64 {
    180
}

fn default_amap_base_url() -> String {
    "https://restapi.amap.com".to_string()
}

fn default_amap_timeout() -> u64 {
    8
}

fn default_batch_limit() -> usize {
    12
}

fn default_page_size() -> u32 {
    10
}

impl PlannerConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with TRIP_MAPPER__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: TRIP_MAPPER__AMAP__KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
pub fn load_config() -> Result<PlannerConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: TRIP_MAPPER__LLM__MODEL
        .add_source(
            Environment::with_prefix("TRIP_MAPPER")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
