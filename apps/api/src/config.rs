use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_EMBEDDING_BASE_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Application configuration loaded from environment variables.
/// Read once at startup and handed to the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub embedding: EmbeddingConfig,
    /// Optional replacement for the bundled skill vocabulary.
    pub skill_vocabulary_path: Option<PathBuf>,
}

/// Connection settings for the embedding provider. Opaque to the scoring code.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_EMBEDDING_BASE_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = EmbeddingConfig::default();

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            embedding: EmbeddingConfig {
                enabled: match optional_env("EMBEDDINGS_ENABLED") {
                    Some(raw) => parse_bool(&raw)
                        .with_context(|| format!("EMBEDDINGS_ENABLED must be a boolean, got '{raw}'"))?,
                    None => defaults.enabled,
                },
                base_url: optional_env("EMBEDDING_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.base_url),
                model: optional_env("EMBEDDING_MODEL").unwrap_or(defaults.model),
                timeout: match optional_env("EMBEDDING_TIMEOUT_SECS") {
                    Some(raw) => Duration::from_secs(
                        raw.parse::<u64>()
                            .context("EMBEDDING_TIMEOUT_SECS must be a whole number of seconds")?,
                    ),
                    None => defaults.timeout,
                },
            },
            skill_vocabulary_path: optional_env("SKILL_VOCABULARY_PATH").map(PathBuf::from),
        })
    }
}

/// Returns the trimmed value of `key`, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
