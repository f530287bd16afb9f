//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `PINECONE_API_KEY` - Vector index API key
//! - `PINECONE_INDEX_HOST` - Vector index query host (e.g., https://my-index-abc123.svc.pinecone.io)
//! - `OPENAI_API_KEY` - Embeddings API key (used to embed queries before retrieval)
//!
//! ## Optional
//! - `MODEL_API_KEY` - Chat model API key. When absent or empty the answer
//!   generator is disabled for the process lifetime and chat responds with a
//!   fixed fallback message instead of failing.
//! - `MODEL_NAME` - Chat model ID (default: deepseek/deepseek-r1-0528-qwen3-8b)
//! - `MODEL_BASE_URL` - OpenAI-compatible completions base URL (default: https://openrouter.ai/api/v1)
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3000)
//! - `BASE_URL` - Public URL (default: http://localhost:3000); secure cookies when https

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Vector index retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Chat model configuration; `None` runs the chat in degraded
    /// fallback-answer mode
    pub generator: Option<GeneratorConfig>,
}

/// Vector index retrieval configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct RetrievalConfig {
    /// Vector index API key
    pub pinecone_api_key: SecretString,
    /// Vector index query host
    pub index_host: String,
    /// Embeddings API key
    pub openai_api_key: SecretString,
}

impl std::fmt::Debug for RetrievalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalConfig")
            .field("pinecone_api_key", &"[REDACTED]")
            .field("index_host", &self.index_host)
            .field("openai_api_key", &"[REDACTED]")
            .finish()
    }
}

/// Chat model configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeneratorConfig {
    /// Chat model API key
    pub api_key: SecretString,
    /// Model ID
    pub model: String,
    /// OpenAI-compatible completions base URL
    pub base_url: String,
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Default chat model ID.
pub const DEFAULT_MODEL_NAME: &str = "deepseek/deepseek-r1-0528-qwen3-8b";

/// Default OpenAI-compatible completions base URL.
pub const DEFAULT_MODEL_BASE_URL: &str = "https://openrouter.ai/api/v1";

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    /// A missing `MODEL_API_KEY` is not an error: the generator is simply
    /// disabled (chat degrades to the fallback answer).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_secret("DATABASE_URL")?;
        let host = get_env_or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("BASE_URL", "http://localhost:3000");

        let retrieval = RetrievalConfig::from_env()?;
        let generator = GeneratorConfig::from_env();

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            retrieval,
            generator,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl RetrievalConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            pinecone_api_key: get_required_secret("PINECONE_API_KEY")?,
            index_host: get_required_env("PINECONE_INDEX_HOST")?,
            openai_api_key: get_required_secret("OPENAI_API_KEY")?,
        })
    }
}

impl GeneratorConfig {
    /// Load the generator configuration, returning `None` when the model API
    /// key is absent or empty.
    fn from_env() -> Option<Self> {
        let api_key = get_optional_env("MODEL_API_KEY").filter(|k| !k.is_empty())?;

        Some(Self {
            api_key: SecretString::from(api_key),
            model: get_env_or_default("MODEL_NAME", DEFAULT_MODEL_NAME),
            base_url: get_env_or_default("MODEL_BASE_URL", DEFAULT_MODEL_BASE_URL),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/medibot"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            retrieval: RetrievalConfig {
                pinecone_api_key: SecretString::from("pc-test-key"),
                index_host: "https://medical-kb-abc123.svc.pinecone.io".to_string(),
                openai_api_key: SecretString::from("sk-test-key"),
            },
            generator: Some(GeneratorConfig {
                api_key: SecretString::from("sk-or-test-key"),
                model: DEFAULT_MODEL_NAME.to_string(),
                base_url: DEFAULT_MODEL_BASE_URL.to_string(),
            }),
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_retrieval_config_debug_redacts_secrets() {
        let config = test_config();
        let debug_output = format!("{:?}", config.retrieval);

        assert!(debug_output.contains("medical-kb-abc123"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("pc-test-key"));
        assert!(!debug_output.contains("sk-test-key"));
    }

    #[test]
    fn test_generator_config_debug_redacts_api_key() {
        let config = test_config();
        let debug_output = format!("{:?}", config.generator.unwrap());

        assert!(debug_output.contains(DEFAULT_MODEL_NAME));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk-or-test-key"));
    }
}
