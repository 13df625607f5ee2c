use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::{TranslateError, UpstreamError};
use super::interface::{TranslationRequest, TranslationResult, TranslationStats, Translator};
use super::prompt::build_prompt;
use crate::config::Config;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    model: String,
    response: String,
    #[serde(default, deserialize_with = "lenient_count")]
    total_duration: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    eval_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    eval_duration: Option<u64>,
}

/// Stats are informational: a float is rounded, anything else unusable is dropped.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| {
        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|n| n.is_finite() && *n >= 0.0 && *n < u64::MAX as f64)
                .map(|n| n.round() as u64)
        })
    }))
}

/// Client for Ollama's `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaTranslator {
    client: Client,
    base_url: String,
    default_model: String,
    timeout: Duration,
    options: GenerateOptions,
}

impl OllamaTranslator {
    pub fn new(client: Client, base_url: impl Into<String>, default_model: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let default_model = default_model.into();
        info!("Initialized OllamaTranslator: model={}, base_url={}", default_model, base_url);

        Self {
            client,
            base_url,
            default_model,
            timeout: Duration::from_secs(300),
            options: GenerateOptions {
                temperature: 0.1,
                num_predict: 4096,
            },
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(client, &config.ollama_url, &config.default_model)
            .with_timeout(Duration::from_secs(config.request_timeout_secs))
            .with_generation(config.temperature, config.num_predict)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_generation(mut self, temperature: f32, num_predict: u32) -> Self {
        self.options = GenerateOptions { temperature, num_predict };
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if Ollama answers at all.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).timeout(Duration::from_secs(5)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Ollama health probe failed: {}", e);
                false
            }
        }
    }

    async fn generate(&self, body: &GenerateRequest<'_>) -> Result<GenerateResponse, UpstreamError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(UpstreamError::Transport)?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl Translator for OllamaTranslator {
    async fn translate(&self, request: TranslationRequest) -> Result<TranslationResult, TranslateError> {
        request.validate()?;

        let source = request.source_language.trim();
        let target = request.target_language.trim();
        let body = GenerateRequest {
            model: request.model.as_deref().unwrap_or(&self.default_model),
            prompt: build_prompt(&request.text, source, target),
            stream: false,
            options: self.options,
        };

        debug!(
            "Translating {} chars {} -> {} with {}",
            request.text.chars().count(),
            source,
            target,
            body.model
        );

        // Dropping the future on expiry aborts the in-flight request.
        let start = std::time::Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.generate(&body)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Ollama call exceeded {:?}, aborting", self.timeout);
                return Err(UpstreamError::Timeout(self.timeout).into());
            }
        };

        let response = result.map_err(|e| {
            warn!("Ollama translation failed: {}", e);
            e
        })?;

        info!(
            "Ollama translation took {}ms ({} -> {}, model {})",
            start.elapsed().as_millis(),
            source,
            target,
            response.model
        );

        Ok(TranslationResult {
            translation: response.response.trim().to_string(),
            model: response.model,
            stats: TranslationStats {
                total_duration: response.total_duration,
                eval_count: response.eval_count,
                eval_duration: response.eval_duration,
            },
        })
    }
}
