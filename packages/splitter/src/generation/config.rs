use std::fmt;

use crate::error::{Result, SplitterError};

const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 8192;
const DEFAULT_TIMEOUT_SECS: u64 = 600;
const DEFAULT_MAX_WORKERS: usize = 8;

/// Configuration for batch chapter generation.
#[derive(Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Deadline for a single generation call.
    pub timeout_secs: u64,
    pub max_workers: usize,
}

impl GenerationConfig {
    /// Load configuration from environment variables.
    ///
    /// `LLM_API_KEY` and `LLM_MODEL` are required; everything else has a
    /// default.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| SplitterError::Config("LLM_API_KEY not set".into()))?;

        let model = std::env::var("LLM_MODEL")
            .map_err(|_| SplitterError::Config("LLM_MODEL not set".into()))?;

        let api_base_url =
            std::env::var("LLM_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());

        let temperature = std::env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TEMPERATURE);

        let max_tokens = std::env::var("LLM_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let timeout_secs = std::env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let max_workers = std::env::var("LLM_MAX_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_WORKERS);

        Ok(Self {
            api_key,
            api_base_url,
            model,
            temperature,
            max_tokens,
            timeout_secs,
            max_workers: max_workers.max(1),
        })
    }

    /// Create a config builder for testing.
    pub fn builder(api_key: impl Into<String>, model: impl Into<String>) -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            api_key: api_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_workers", &self.max_workers)
            .finish()
    }
}

/// Builder for constructing `GenerationConfig` in tests.
pub struct GenerationConfigBuilder {
    api_key: String,
    api_base_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    timeout_secs: u64,
    max_workers: usize,
}

impl GenerationConfigBuilder {
    pub fn api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn build(self) -> GenerationConfig {
        GenerationConfig {
            api_key: self.api_key,
            api_base_url: self.api_base_url,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
            max_workers: self.max_workers.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = GenerationConfig::builder("key", "some-model").build();
        assert_eq!(config.api_base_url, "https://api.openai.com/v1");
        assert_eq!(config.max_tokens, 8192);
        assert_eq!(config.timeout_secs, 600);
        assert_eq!(config.max_workers, 8);
        assert!((config.temperature - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_clamps_workers() {
        let config = GenerationConfig::builder("key", "m").max_workers(0).build();
        assert_eq!(config.max_workers, 1);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = GenerationConfig::builder("secret-key", "m").build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
