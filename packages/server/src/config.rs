use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Deployment environment, used to pick the storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse from the `ENVIRONMENT` variable. Anything other than
    /// "production" is treated as development.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub environment: Environment,
    pub openai_api_key: String,
    pub gemini_api_key: String,
    /// Directory the local storage backend writes into.
    pub media_dir: PathBuf,
    /// Public base URL the local backend's files are served under.
    pub media_base_url: String,
    /// Durable blob store endpoint (required in production).
    pub blob_store_url: Option<String>,
    pub blob_store_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT must be a valid number")?;

        let environment = Environment::parse(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        );

        let config = Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port,
            environment,
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            gemini_api_key: env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?,
            media_dir: env::var("MEDIA_DIR")
                .unwrap_or_else(|_| "./media".to_string())
                .into(),
            media_base_url: env::var("MEDIA_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}/media", port)),
            blob_store_url: env::var("BLOB_STORE_URL").ok(),
            blob_store_token: env::var("BLOB_STORE_TOKEN").ok(),
        };

        if config.environment == Environment::Production && config.blob_store_url.is_none() {
            anyhow::bail!("BLOB_STORE_URL must be set in production");
        }

        Ok(config)
    }
}
