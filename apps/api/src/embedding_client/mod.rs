/// Embedding Client — the single point of entry for semantic embedding calls.
///
/// ARCHITECTURAL RULE: scoring code never talks to the provider directly.
/// It holds an `Arc<dyn EmbeddingClient>` and treats every error as "no
/// embedding" for that text. No retries happen at this boundary.
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EmbeddingConfig;

const EMBEDDINGS_PATH: &str = "/api/embeddings";

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Malformed embedding payload: {0}")]
    Malformed(String),

    #[error("Embeddings are disabled")]
    Disabled,
}

/// Capability to turn a text into a dense vector.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Calls `client.embed` and folds any failure into `None`, logging the reason.
pub async fn embed_or_absent(client: &dyn EmbeddingClient, text: &str) -> Option<Vec<f32>> {
    match client.embed(text).await {
        Ok(vector) => Some(vector),
        Err(EmbeddingError::Disabled) => None,
        Err(e) => {
            warn!("Embedding unavailable, degrading to lexical: {e}");
            None
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Option<serde_json::Value>,
}

/// Client for an Ollama-compatible `/api/embeddings` endpoint.
#[derive(Clone)]
pub struct OllamaEmbeddingClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaEmbeddingClient {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        Ok(Self {
            client: Client::builder().timeout(config.timeout).build()?,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), EMBEDDINGS_PATH),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Malformed(e.to_string()))?;
        let vector = parse_embedding(body.embedding)?;

        debug!("Embedding call succeeded: dimensions={}", vector.len());
        Ok(vector)
    }
}

/// Stand-in used when embeddings are switched off; always reports `Disabled`.
pub struct DisabledEmbeddingClient;

#[async_trait]
impl EmbeddingClient for DisabledEmbeddingClient {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Disabled)
    }
}

/// Builds the configured client. Falls back to `DisabledEmbeddingClient`
/// when embeddings are turned off.
pub fn build_embedding_client(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingClient>, EmbeddingError> {
    if !config.enabled {
        return Ok(Arc::new(DisabledEmbeddingClient));
    }
    Ok(Arc::new(OllamaEmbeddingClient::new(config)?))
}

/// Validates the `embedding` field: a non-empty array of finite numbers.
fn parse_embedding(raw: Option<serde_json::Value>) -> Result<Vec<f32>, EmbeddingError> {
    let items = match raw {
        Some(serde_json::Value::Array(items)) => items,
        Some(other) => {
            return Err(EmbeddingError::Malformed(format!(
                "expected an array, got {other}"
            )))
        }
        None => return Err(EmbeddingError::Malformed("missing `embedding` field".into())),
    };

    if items.is_empty() {
        return Err(EmbeddingError::Malformed("empty embedding".into()));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_f64()
                .map(|v| v as f32)
                .filter(|v| v.is_finite())
                .ok_or_else(|| EmbeddingError::Malformed(format!("non-numeric value at index {i}")))
        })
        .collect()
}
