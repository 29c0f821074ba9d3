use thiserror::Error;

/// Errors that can occur while planning an itinerary or talking to its services
#[derive(Error, Debug)]
pub enum PlannerError {
    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Response body or stored document was not valid JSON
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Language-model provider rejected the request or returned garbage
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Mapping service answered with a non-success status payload
    #[error("Mapping service error (status {status}, info {info})")]
    MapServiceError { status: String, info: String },

    /// A required API key is not configured
    #[error("Missing credentials for {0}")]
    MissingCredentials(String),

    /// Saved itinerary lookup failed
    #[error("Itinerary not found: {0}")]
    NotFound(String),

    /// Caller supplied a value that cannot be stored
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
