use helpline_core::credentials::Credentials;
use secrecy::{ExposeSecret, SecretString};
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: SecretString,
    pub agent_id: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let api_key = std::env::var("ELEVENLABS_API_KEY")
            .map_err(|_| ConfigError::MissingVar("ELEVENLABS_API_KEY".to_string()))?;
        let agent_id = std::env::var("ELEVENLABS_AGENT_ID")
            .map_err(|_| ConfigError::MissingVar("ELEVENLABS_AGENT_ID".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            agent_id,
            log_level,
        })
    }

    /// Builds the credential pair handed to the session core.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.api_key.expose_secret(), self.agent_id.clone())
    }
}
